//! Integration tests for the request bus contract
//!
//! Unknown targets, unknown methods, and malformed arguments all fail with a
//! contract error that names the call.

use stagehand_editor::EditorConfig;
use stagehand_foundation::names::{editor, entity, notify, prefab};
use stagehand_foundation::{Address, EditorBus, EntityId, ErrorKind, Value};

use crate::{call, editor_with_level, send};

// =============================================================================
// Contract Failures
// =============================================================================

#[test]
fn unknown_bus_is_no_such_method() {
    let mut bus = editor_with_level(EditorConfig::immediate());
    let err = bus.broadcast("NopeBus", "Anything", &[]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NoSuchMethod { .. }));
    assert!(err.is_contract_failure());
}

#[test]
fn unknown_method_names_the_call() {
    let mut bus = editor_with_level(EditorConfig::immediate());
    let err = bus.broadcast(entity::BUS, "Teleport", &[]).unwrap_err();
    let context = err.context.unwrap();
    assert_eq!(context.bus.as_deref(), Some(entity::BUS));
    assert_eq!(context.method.as_deref(), Some("Teleport"));
}

#[test]
fn wrong_arity_and_wrong_type_are_contract_failures() {
    let mut bus = editor_with_level(EditorConfig::immediate());
    let err = bus
        .broadcast(editor::BUS, editor::IS_LEVEL_ACTIVE, &[Value::from(1_i64)])
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ArityMismatch { .. }));

    let err = bus
        .broadcast(entity::BUS, entity::FIND_BY_NAME, &[Value::from(3_i64)])
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn events_to_dead_entities_are_invalid_target() {
    let mut bus = editor_with_level(EditorConfig::immediate());
    let e: EntityId = call(&mut bus, entity::BUS, entity::CREATE, &[]);
    let removed: Vec<EntityId> = send(&mut bus, entity::BUS, entity::DELETE, e, &[]);
    assert_eq!(removed, vec![e]);

    let err = bus.event(entity::BUS, entity::GET_NAME, e, &[]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidTarget(id) if id == e));
}

#[test]
fn request_buses_refuse_handlers() {
    let mut bus = editor_with_level(EditorConfig::immediate());
    assert!(bus.connect(prefab::BUS, Address::Broadcast).is_err());
    assert!(bus.connect(notify::PREFAB, Address::Broadcast).is_ok());
}

// =============================================================================
// Shutdown
// =============================================================================

#[test]
fn every_call_fails_after_close() {
    let mut bus = editor_with_level(EditorConfig::immediate());
    let _: () = call(&mut bus, editor::BUS, editor::CLOSE_EDITOR, &[]);
    assert!(!bus.is_alive());

    let err = bus.broadcast(editor::BUS, editor::IS_LEVEL_ACTIVE, &[]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::EngineLost));
    assert!(matches!(bus.tick().unwrap_err().kind, ErrorKind::EngineLost));
}
