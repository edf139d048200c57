//! Integration tests for World state management
//!
//! Tests world immutability, structural sharing, and entity lifetime.

use stagehand_foundation::{ErrorKind, Vec3};
use stagehand_storage::World;

// =============================================================================
// World Creation
// =============================================================================

#[test]
fn world_starts_empty() {
    let world = World::new();
    assert_eq!(world.entity_count(), 0);
    assert_eq!(world.roots().count(), 0);
}

// =============================================================================
// World Immutability
// =============================================================================

#[test]
fn spawn_returns_new_world() {
    let world1 = World::new();
    let (world2, entity) = world1.spawn("Entity1", None, Vec3::ZERO, None).unwrap();

    assert_eq!(world1.entity_count(), 0);
    assert_eq!(world2.entity_count(), 1);
    assert!(!world1.exists(entity));
    assert!(world2.exists(entity));
}

#[test]
fn rename_leaves_old_snapshot_alone() {
    let (world, e) = World::new().spawn("before", None, Vec3::ZERO, None).unwrap();
    let renamed = world.set_name(e, "after").unwrap();
    assert_eq!(world.name(e).unwrap(), "before");
    assert_eq!(renamed.name(e).unwrap(), "after");
}

// =============================================================================
// Entity Lifetime
// =============================================================================

#[test]
fn destroy_removes_descendants_in_pre_order() {
    let world = World::new();
    let (world, a) = world.spawn("a", None, Vec3::ZERO, None).unwrap();
    let (world, b) = world.spawn("b", Some(a), Vec3::ZERO, None).unwrap();
    let (world, c) = world.spawn("c", Some(b), Vec3::ZERO, None).unwrap();
    let (world, d) = world.spawn("d", Some(a), Vec3::ZERO, None).unwrap();

    let (after, removed) = world.destroy(a).unwrap();
    assert_eq!(removed, vec![a, b, c, d]);
    assert_eq!(after.entity_count(), 0);
    assert!(world.exists(c));
}

#[test]
fn destroyed_ids_stay_invalid_after_reuse() {
    let (world, a) = World::new().spawn("a", None, Vec3::ZERO, None).unwrap();
    let (world, _) = world.destroy(a).unwrap();
    let (world, b) = world.spawn("b", None, Vec3::ZERO, None).unwrap();

    assert_ne!(a, b);
    assert!(!world.exists(a));
    let err = world.name(a).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidTarget(_)));
}

#[test]
fn find_by_name_visits_trees_in_order() {
    let world = World::new();
    let (world, first) = world.spawn("first", None, Vec3::ZERO, None).unwrap();
    let (world, nested) = world.spawn("dup", Some(first), Vec3::ZERO, None).unwrap();
    let (world, _) = world.spawn("dup", None, Vec3::ZERO, None).unwrap();
    assert_eq!(world.find_by_name("dup"), Some(nested));
    assert_eq!(world.find_by_name("missing"), None);
}
