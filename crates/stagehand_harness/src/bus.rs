//! Typed bus calls and scoped notification subscriptions.
//!
//! A [`Subscription`] owns one connected handler. Callbacks registered with
//! [`Subscription::on`] run during [`Session::tick`], in the order the editor
//! produced the notifications across every live subscription. Dropping the
//! subscription disconnects its handler at the next dispatch, so release
//! happens on every exit path.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use stagehand_foundation::{
    Address, EntityId, Error, FromValue, HandlerId, Notification, Result, Value,
};
use tracing::{debug, trace};

use crate::error::HarnessResult;
use crate::session::Session;

type Callback = Box<dyn FnMut(&[Value])>;

struct Listener {
    event: String,
    callback: Callback,
}

/// Listener registry shared between a session and its subscriptions.
#[derive(Default)]
pub(crate) struct Dispatcher {
    channels: BTreeMap<HandlerId, Vec<Listener>>,
    released: Vec<HandlerId>,
    /// Handlers dropped while the registry itself was borrowed.
    deferred: Rc<RefCell<Vec<HandlerId>>>,
}

impl Dispatcher {
    /// Unregisters `handler`, handing back its listeners so the caller drops
    /// them after the registry borrow ends.
    fn release(&mut self, handler: HandlerId) -> Option<Vec<Listener>> {
        let listeners = self.channels.remove(&handler)?;
        self.released.push(handler);
        Some(listeners)
    }
}

/// A connected notification handler. Disconnects when dropped.
pub struct Subscription {
    handler: HandlerId,
    bus: String,
    dispatcher: Rc<RefCell<Dispatcher>>,
    deferred: Rc<RefCell<Vec<HandlerId>>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("handler", &self.handler)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

impl Subscription {
    /// Registers `callback` for `event`. Callbacks receive the positional
    /// notification arguments.
    pub fn on(&self, event: &str, callback: impl FnMut(&[Value]) + 'static) -> &Self {
        if let Some(listeners) = self.dispatcher.borrow_mut().channels.get_mut(&self.handler) {
            listeners.push(Listener {
                event: event.to_string(),
                callback: Box::new(callback),
            });
        }
        self
    }

    /// The connected handler.
    #[must_use]
    pub fn handler(&self) -> HandlerId {
        self.handler
    }

    /// The notification bus.
    #[must_use]
    pub fn bus(&self) -> &str {
        &self.bus
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // A subscription owned by a listener is dropped while the registry
        // removes that listener; the release then waits for the next dispatch.
        let listeners = match self.dispatcher.try_borrow_mut() {
            Ok(mut dispatcher) => dispatcher.release(self.handler),
            Err(_) => {
                debug!(handler = %self.handler, "unsubscribe_deferred");
                self.deferred.borrow_mut().push(self.handler);
                None
            }
        };
        drop(listeners);
    }
}

/// Names the call a result conversion failed for.
fn with_call(mut err: Error, bus: &str, method: &str) -> Error {
    let context = err.context.take().unwrap_or_default();
    let context = if context.bus.is_some() {
        context
    } else {
        context.with_call(bus, method)
    };
    err.with_context(context)
}

impl Session {
    /// Calls an addressless method and converts the result.
    ///
    /// # Errors
    ///
    /// Returns the bus error, or `TypeMismatch` if the result has another shape.
    pub fn broadcast<T: FromValue>(&mut self, bus: &str, method: &str, args: &[Value]) -> Result<T> {
        trace!(bus, method, "broadcast");
        let value = self.bus.broadcast(bus, method, args)?;
        T::from_value(value).map_err(|e| with_call(e, bus, method))
    }

    /// Calls a method addressed to `target` and converts the result.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for unknown entities, the bus error, or
    /// `TypeMismatch` if the result has another shape.
    pub fn event<T: FromValue>(
        &mut self,
        bus: &str,
        method: &str,
        target: EntityId,
        args: &[Value],
    ) -> Result<T> {
        trace!(bus, method, %target, "event");
        let value = self.bus.event(bus, method, target, args)?;
        T::from_value(value).map_err(|e| with_call(e, bus, method))
    }

    /// Connects a handler on `bus`.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchMethod` if the bus carries no notifications.
    pub fn subscribe(&mut self, bus: &str, address: Address) -> HarnessResult<Subscription> {
        let handler = self.bus.connect(bus, address)?;
        let deferred = {
            let mut dispatcher = self.dispatcher.borrow_mut();
            dispatcher.channels.insert(handler, Vec::new());
            Rc::clone(&dispatcher.deferred)
        };
        debug!(bus, %handler, ?address, "subscribed");
        Ok(Subscription {
            handler,
            bus: bus.to_string(),
            dispatcher: Rc::clone(&self.dispatcher),
            deferred,
        })
    }

    /// Runs `f` with a subscription that is released when `f` returns, even
    /// with an error.
    ///
    /// # Errors
    ///
    /// Returns the connect error or whatever `f` returns.
    pub fn with_subscription<R>(
        &mut self,
        bus: &str,
        address: Address,
        f: impl FnOnce(&mut Session, &Subscription) -> HarnessResult<R>,
    ) -> HarnessResult<R> {
        let subscription = self.subscribe(bus, address)?;
        let result = f(self, &subscription);
        drop(subscription);
        self.release_subscriptions();
        result
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.dispatcher.borrow().channels.len()
    }

    fn release_subscriptions(&mut self) {
        loop {
            let deferred = std::mem::take(&mut *self.dispatcher.borrow().deferred.borrow_mut());
            if deferred.is_empty() {
                break;
            }
            for handler in deferred {
                let listeners = self.dispatcher.borrow_mut().release(handler);
                drop(listeners);
            }
        }
        let released = std::mem::take(&mut self.dispatcher.borrow_mut().released);
        for handler in released {
            self.bus.disconnect(handler);
            debug!(%handler, "unsubscribed");
        }
    }

    /// Delivers queued notifications to subscription callbacks in production
    /// order.
    pub(crate) fn dispatch_notifications(&mut self) {
        self.release_subscriptions();
        let handlers: Vec<HandlerId> = self.dispatcher.borrow().channels.keys().copied().collect();
        let mut pending: Vec<(HandlerId, Notification)> = Vec::new();
        for handler in handlers {
            pending.extend(
                self.bus
                    .take_notifications(handler)
                    .into_iter()
                    .map(|n| (handler, n)),
            );
        }
        pending.sort_by_key(|(_, n)| n.sequence);

        for (handler, notification) in pending {
            // Take the listeners out so callbacks can subscribe or drop
            // subscriptions without re-entering the borrow.
            let taken = self
                .dispatcher
                .borrow_mut()
                .channels
                .get_mut(&handler)
                .map(std::mem::take);
            let Some(mut listeners) = taken else {
                continue;
            };
            for listener in listeners
                .iter_mut()
                .filter(|l| l.event == notification.event)
            {
                (listener.callback)(&notification.args);
            }
            trace!(
                %handler,
                event = %notification.event,
                sequence = notification.sequence,
                "notification_dispatched"
            );
            let mut dispatcher = self.dispatcher.borrow_mut();
            if let Some(slot) = dispatcher.channels.get_mut(&handler) {
                let added = std::mem::take(slot);
                *slot = listeners;
                slot.extend(added);
            }
        }
        self.release_subscriptions();
    }
}
