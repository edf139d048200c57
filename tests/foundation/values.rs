//! Integration tests for Value and typed extraction

use proptest::prelude::*;
use stagehand_foundation::{AssetId, EntityId, FromValue, Type, Value, Vec3};

// =============================================================================
// Value Types
// =============================================================================

#[test]
fn scalar_conversions_pick_the_right_variant() {
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from(3_i64), Value::Int(3));
    assert_eq!(Value::from(2.5), Value::Float(2.5));
    assert_eq!(Value::from("x").value_type(), Type::String);
    assert_eq!(Value::from(Vec3::splat(1.0)).value_type(), Type::Vec3);
    assert_eq!(Value::from(AssetId(7)).value_type(), Type::Asset);
}

#[test]
fn none_becomes_nil() {
    let none: Option<Vec3> = None;
    assert!(Value::from(none).is_nil());
}

#[test]
fn int_widens_to_float_on_read() {
    assert_eq!(f64::from_value(Value::Int(4)).unwrap(), 4.0);
    assert!(i64::from_value(Value::Float(4.0)).is_err());
}

#[test]
fn nested_lists_extract() {
    let e = EntityId::new(9, 2);
    let value = Value::from(vec![Value::from(e), Value::Nil]);
    let ids = Vec::<Option<EntityId>>::from_value(value).unwrap();
    assert_eq!(ids, vec![Some(e), None]);
}

// =============================================================================
// Entity Ids
// =============================================================================

#[test]
fn null_entity_is_distinct() {
    assert!(EntityId::null().is_null());
    assert!(!EntityId::new(0, 1).is_null());
    assert_ne!(EntityId::new(1, 1), EntityId::new(1, 2));
}

#[test]
fn invalid_asset_is_zero() {
    assert!(!AssetId::INVALID.is_valid());
    assert!(AssetId(1).is_valid());
}

// =============================================================================
// Vec3
// =============================================================================

#[test]
fn is_close_uses_tolerance() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    assert!(a.is_close(Vec3::new(1.00001, 2.0, 3.0), Vec3::TOLERANCE));
    assert!(!a.is_close(Vec3::new(1.01, 2.0, 3.0), Vec3::TOLERANCE));
}

proptest! {
    #[test]
    fn strings_survive_extraction(s in "[a-zA-Z0-9 _|.]{0,24}") {
        let back = String::from_value(Value::from(s.as_str())).unwrap();
        prop_assert_eq!(back, s);
    }

    #[test]
    fn vectors_are_close_to_themselves(x in -1e6f64..1e6, y in -1e6f64..1e6, z in -1e6f64..1e6) {
        let v = Vec3::new(x, y, z);
        prop_assert!(v.is_close(v, Vec3::TOLERANCE));
    }
}
