//! Notification fan-out to connected handlers.
//!
//! Every emitted notification gets the next global sequence number and is
//! copied into the queue of each handler whose bus and address match. Queues
//! are drained by the harness after each tick.

use std::collections::{BTreeMap, VecDeque};

use stagehand_foundation::names::notify;
use stagehand_foundation::{Address, Error, HandlerId, Notification, Result, Value};
use tracing::debug;

#[derive(Clone, Debug)]
struct Handler {
    bus: String,
    address: Address,
    queue: VecDeque<Notification>,
}

/// Per-handler notification queues.
#[derive(Clone, Debug, Default)]
pub struct NotificationHub {
    handlers: BTreeMap<HandlerId, Handler>,
    next_handler: u64,
    next_sequence: u64,
}

impl NotificationHub {
    /// Creates a hub with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects a handler to a notification bus.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchMethod` if the bus carries no notifications.
    pub fn connect(&mut self, bus: &str, address: Address) -> Result<HandlerId> {
        if !notify::ALL.contains(&bus) {
            return Err(Error::no_such_method(bus, "connect"));
        }
        self.next_handler += 1;
        let id = HandlerId(self.next_handler);
        self.handlers.insert(
            id,
            Handler {
                bus: bus.to_string(),
                address,
                queue: VecDeque::new(),
            },
        );
        debug!(handler = %id, bus, ?address, "handler_connected");
        Ok(id)
    }

    /// Disconnects a handler, dropping anything still queued for it.
    pub fn disconnect(&mut self, handler: HandlerId) {
        if self.handlers.remove(&handler).is_some() {
            debug!(handler = %handler, "handler_disconnected");
        }
    }

    /// Drops every handler.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Number of connected handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Removes and returns the queued notifications of one handler.
    pub fn take(&mut self, handler: HandlerId) -> Vec<Notification> {
        self.handlers
            .get_mut(&handler)
            .map(|h| h.queue.drain(..).collect())
            .unwrap_or_default()
    }

    /// Emits a notification to every matching handler.
    pub fn emit(&mut self, bus: &str, address: Address, event: &str, args: Vec<Value>) {
        self.next_sequence += 1;
        let notification = Notification {
            sequence: self.next_sequence,
            bus: bus.to_string(),
            address,
            event: event.to_string(),
            args,
        };
        debug!(
            sequence = notification.sequence,
            bus,
            event,
            "notification_emitted"
        );
        for handler in self.handlers.values_mut() {
            if handler.bus == bus && handler.address.matches(address) {
                handler.queue.push_back(notification.clone());
            }
        }
    }
}
