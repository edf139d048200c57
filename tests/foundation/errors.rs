//! Integration tests for Error types
//!
//! Tests error construction, display, context, and contract classification.

use stagehand_foundation::{EntityId, Error, ErrorContext, ErrorKind, Type};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_type_mismatch() {
    let err = Error::type_mismatch(Type::Vec3, Type::String);
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    let msg = format!("{err}");
    assert!(msg.contains("vec3"));
    assert!(msg.contains("string"));
}

#[test]
fn error_invalid_target() {
    let err = Error::invalid_target(EntityId::new(42, 1));
    assert!(matches!(err.kind, ErrorKind::InvalidTarget(_)));
    assert!(format!("{err}").contains("42"));
}

#[test]
fn error_no_such_method() {
    let err = Error::no_such_method("EditorEntityRequestBus", "Fly");
    assert_eq!(
        format!("{err}"),
        "no such method: EditorEntityRequestBus.Fly"
    );
}

#[test]
fn error_engine_lost() {
    let err = Error::new(ErrorKind::EngineLost);
    assert_eq!(format!("{err}"), "editor connection lost");
    assert!(!err.is_contract_failure());
}

// =============================================================================
// Contract Failures
// =============================================================================

#[test]
fn contract_failures_are_the_bus_level_kinds() {
    assert!(Error::invalid_target(EntityId::new(1, 1)).is_contract_failure());
    assert!(Error::no_such_method("Bus", "M").is_contract_failure());
    assert!(Error::type_mismatch(Type::Bool, Type::Int).is_contract_failure());
    assert!(Error::arity_mismatch("1".into(), 2).is_contract_failure());
    assert!(!Error::new(ErrorKind::NoLevelLoaded).is_contract_failure());
    assert!(!Error::new(ErrorKind::TemplateNotFound("x".into())).is_contract_failure());
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn context_records_call_and_frames() {
    let err = Error::new(ErrorKind::NoLevelLoaded)
        .with_context(ErrorContext::new().with_call("PrefabPublicRequestBus", "DuplicateInstance"))
        .in_frame("duplicate_prefab");
    let context = err.context.unwrap();
    assert_eq!(context.bus.as_deref(), Some("PrefabPublicRequestBus"));
    assert_eq!(context.method.as_deref(), Some("DuplicateInstance"));
    assert_eq!(context.stack, vec!["duplicate_prefab".to_string()]);
}

#[test]
fn in_frame_creates_context_when_missing() {
    let err = Error::internal("boom").in_frame("outer").in_frame("outermost");
    let context = err.context.unwrap();
    assert!(context.bus.is_none());
    assert_eq!(context.stack, vec!["outer".to_string(), "outermost".to_string()]);
}

#[test]
fn context_display_names_the_call() {
    let context = ErrorContext::new().with_call("EditorRequestBus", "OpenLevel");
    assert_eq!(context.to_string(), "in EditorRequestBus.OpenLevel");
}
