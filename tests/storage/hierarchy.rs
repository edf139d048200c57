//! Integration tests for parent/child links and transforms

use stagehand_foundation::{ErrorKind, Vec3};
use stagehand_storage::World;

fn close(a: Vec3, b: Vec3) -> bool {
    a.is_close(b, Vec3::TOLERANCE)
}

#[test]
fn children_keep_sibling_order() {
    let world = World::new();
    let (world, p) = world.spawn("p", None, Vec3::ZERO, None).unwrap();
    let (world, a) = world.spawn("a", Some(p), Vec3::ZERO, None).unwrap();
    let (world, b) = world.spawn("b", Some(p), Vec3::ZERO, None).unwrap();
    let (world, c) = world.spawn("c", Some(p), Vec3::ZERO, Some(0)).unwrap();

    assert_eq!(world.children(p).unwrap(), vec![c, a, b]);
    assert_eq!(world.sibling_index(b), Some(2));
    assert_eq!(world.parent(a).unwrap(), Some(p));
}

#[test]
fn world_translation_sums_up_the_tree() {
    let world = World::new();
    let (world, p) = world.spawn("p", None, Vec3::new(1.0, 0.0, 0.0), None).unwrap();
    let (world, c) = world.spawn("c", Some(p), Vec3::new(0.0, 2.0, 0.0), None).unwrap();
    assert!(close(world.world_translation(c).unwrap(), Vec3::new(1.0, 2.0, 0.0)));
    assert!(close(world.local_translation(c).unwrap(), Vec3::new(0.0, 2.0, 0.0)));
}

#[test]
fn moving_a_parent_moves_descendants() {
    let world = World::new();
    let (world, p) = world.spawn("p", None, Vec3::splat(100.0), None).unwrap();
    let (world, c) = world.spawn("c", Some(p), Vec3::ZERO, None).unwrap();
    let world = world.set_world_translation(p, Vec3::splat(200.0)).unwrap();
    assert!(close(world.world_translation(c).unwrap(), Vec3::splat(200.0)));
}

#[test]
fn reparent_keeps_world_translation() {
    let world = World::new();
    let (world, p) = world.spawn("p", None, Vec3::new(10.0, 0.0, 0.0), None).unwrap();
    let (world, c) = world.spawn("c", None, Vec3::new(0.0, 5.0, 0.0), None).unwrap();

    let moved = world.reparent(c, Some(p), None).unwrap();
    assert_eq!(moved.parent(c).unwrap(), Some(p));
    assert!(close(moved.world_translation(c).unwrap(), Vec3::new(0.0, 5.0, 0.0)));
    assert!(close(moved.local_translation(c).unwrap(), Vec3::new(-10.0, 5.0, 0.0)));

    let back = moved.reparent(c, None, None).unwrap();
    assert_eq!(back.parent(c).unwrap(), None);
    assert!(close(back.local_translation(c).unwrap(), Vec3::new(0.0, 5.0, 0.0)));
}

#[test]
fn reparent_under_descendant_is_a_cycle() {
    let world = World::new();
    let (world, a) = world.spawn("a", None, Vec3::ZERO, None).unwrap();
    let (world, b) = world.spawn("b", Some(a), Vec3::ZERO, None).unwrap();

    for parent in [a, b] {
        let err = world.reparent(a, Some(parent), None).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ReparentCycle { .. }));
    }
    assert!(world.is_ancestor(a, b));
    assert_eq!(world.ancestors(b).collect::<Vec<_>>(), vec![a]);
}
