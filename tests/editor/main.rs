//! Integration tests for Layer 2: Editor
//!
//! Drives the in-process editor only through its bus surface, the way the
//! harness does.

mod bus_contract;
mod levels;
mod notifications;

use stagehand_editor::{Editor, EditorConfig};
use stagehand_foundation::names::editor;
use stagehand_foundation::{EditorBus, EntityId, FromValue, Value};

/// Broadcasts and converts the result, panicking on failure.
pub fn call<T: FromValue>(bus: &mut Editor, name: &str, method: &str, args: &[Value]) -> T {
    let value = bus
        .broadcast(name, method, args)
        .unwrap_or_else(|e| panic!("{name}.{method} failed: {e}"));
    T::from_value(value).unwrap()
}

/// Sends an event to `target` and converts the result, panicking on failure.
pub fn send<T: FromValue>(
    bus: &mut Editor,
    name: &str,
    method: &str,
    target: EntityId,
    args: &[Value],
) -> T {
    let value = bus
        .event(name, method, target, args)
        .unwrap_or_else(|e| panic!("{name}.{method} on {target} failed: {e}"));
    T::from_value(value).unwrap()
}

/// Ticks until no background work is queued.
pub fn settle(bus: &mut Editor) {
    for _ in 0..64 {
        let pending: i64 = call(bus, editor::BUS, editor::PENDING_WORK_COUNT, &[]);
        if pending == 0 {
            return;
        }
        bus.tick().unwrap();
    }
    panic!("editor never settled");
}

/// An editor with an active level named `Base`.
pub fn editor_with_level(config: EditorConfig) -> Editor {
    let mut bus = Editor::new(config).unwrap();
    let created: bool = call(&mut bus, editor::BUS, editor::CREATE_LEVEL, &[Value::from("Base")]);
    assert!(created);
    settle(&mut bus);
    bus
}
