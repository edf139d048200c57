//! The editor bus contract.
//!
//! Scenario code never touches engine state directly. Every read and write is
//! a request on a named bus, either addressless ([`EditorBus::broadcast`]) or
//! addressed to one entity ([`EditorBus::event`]). Engine-side notifications
//! are queued per connected handler and collected with
//! [`EditorBus::take_notifications`] after each [`EditorBus::tick`].

use std::fmt;

use crate::entity::EntityId;
use crate::value::Value;
use crate::Result;

/// Who a notification handler listens to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Address {
    /// Every notification on the bus.
    Broadcast,
    /// Only notifications addressed to this entity.
    Entity(EntityId),
}

impl Address {
    /// Returns true if a notification sent to `target` reaches this address.
    #[must_use]
    pub fn matches(self, target: Address) -> bool {
        match (self, target) {
            (Address::Broadcast, _) => true,
            (Address::Entity(a), Address::Entity(b)) => a == b,
            (Address::Entity(_), Address::Broadcast) => false,
        }
    }
}

/// Identifier of a connected notification handler.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub u64);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler#{}", self.0)
    }
}

/// One engine notification as delivered to a handler.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    /// Global production order; strictly increasing across all buses.
    pub sequence: u64,
    /// The notification bus.
    pub bus: String,
    /// Where the notification was sent.
    pub address: Address,
    /// Event name, e.g. `propagation_end`.
    pub event: String,
    /// Positional arguments.
    pub args: Vec<Value>,
}

/// The request/notification surface of a running editor.
///
/// All methods run on the caller's thread; the editor only advances when
/// [`EditorBus::tick`] is called.
pub trait EditorBus {
    /// Invokes an addressless method.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchMethod`, `TypeMismatch`/`ArityMismatch` for malformed
    /// arguments, or the operation's own failure kind.
    fn broadcast(&mut self, bus: &str, method: &str, args: &[Value]) -> Result<Value>;

    /// Invokes a method addressed to one entity.
    ///
    /// # Errors
    ///
    /// As [`EditorBus::broadcast`], plus `InvalidTarget` when `target` is unknown.
    fn event(&mut self, bus: &str, method: &str, target: EntityId, args: &[Value])
        -> Result<Value>;

    /// Connects a notification handler.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchMethod` if the bus carries no notifications.
    fn connect(&mut self, bus: &str, address: Address) -> Result<HandlerId>;

    /// Disconnects a handler. Unknown handlers are ignored.
    fn disconnect(&mut self, handler: HandlerId);

    /// Removes and returns the notifications queued for `handler`, oldest first.
    fn take_notifications(&mut self, handler: HandlerId) -> Vec<Notification>;

    /// Runs one idle tick of the editor's main loop.
    ///
    /// # Errors
    ///
    /// Returns `EngineLost` once the editor has shut down.
    fn tick(&mut self) -> Result<()>;

    /// Returns false once the editor has shut down.
    fn is_alive(&self) -> bool;
}
