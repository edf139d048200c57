//! Level, entity, and prefab facades.

use stagehand_foundation::{ErrorKind, Vec3};
use stagehand_harness::{ExpectedTree, LevelParams, PrefabTemplate};

use crate::session;

// =============================================================================
// Levels
// =============================================================================

#[test]
fn refused_level_is_reported_as_info() {
    let mut session = session();
    let params = LevelParams::default().with_heightmap_resolution(100);
    assert!(!session.create_level("Odd", &params).unwrap());
    assert!(session
        .reporter()
        .lines()
        .iter()
        .any(|l| l == "Info: Could not create level Odd"));
    assert_eq!(session.current_level_name().unwrap().as_deref(), Some("Base"));
}

#[test]
fn open_level_switches_levels() {
    let mut session = session();
    assert!(session.create_level("Other", &LevelParams::default()).unwrap());
    assert!(session.open_level("Base").unwrap());
    assert_eq!(session.current_level_name().unwrap().as_deref(), Some("Base"));
    assert!(!session.open_level("Missing").unwrap());
}

// =============================================================================
// Entities
// =============================================================================

#[test]
fn created_entity_lands_under_the_level_root() {
    let mut session = session();
    let root = session.level_root().unwrap();
    let entity = session.create_entity(Some("Crate"), None, None).unwrap();

    assert_eq!(entity.parent, Some(root.id));
    assert_eq!(entity.name, "Crate");
    assert!(session.world_position(entity.id).unwrap().is_close(Vec3::ZERO, Vec3::TOLERANCE));
    assert_eq!(session.find_entity("Crate").unwrap(), Some(entity));
}

#[test]
fn child_position_is_relative_to_its_parent() {
    let mut session = session();
    let parent = session
        .create_entity(Some("Parent"), None, Some(Vec3::new(10.0, 0.0, 0.0)))
        .unwrap();
    let child = session
        .create_entity(Some("Child"), Some(&parent), Some(Vec3::new(12.0, 1.0, 0.0)))
        .unwrap();

    let local = session.local_position(child.id).unwrap();
    assert!(local.is_close(Vec3::new(2.0, 1.0, 0.0), Vec3::TOLERANCE));
    assert_eq!(session.entity_children(parent.id).unwrap(), vec![child.id]);
}

#[test]
fn delete_takes_descendants_along() {
    let mut session = session();
    let parent = session.create_entity(Some("Parent"), None, None).unwrap();
    let child = session.create_entity(Some("Child"), Some(&parent), None).unwrap();

    let removed = session.delete_entity(&parent).unwrap();
    assert!(removed.contains(&parent.id));
    assert!(removed.contains(&child.id));
    assert!(!session.is_valid(child.id).unwrap());

    let err = session.entity_name(child.id).unwrap_err();
    assert!(matches!(err.engine_kind(), Some(ErrorKind::InvalidTarget(_))));
}

#[test]
fn rename_updates_handle_and_lookup() {
    let mut session = session();
    let mut entity = session.create_entity(None, None, None).unwrap();
    session.set_entity_name(&mut entity, "Renamed").unwrap();

    assert_eq!(entity.name, "Renamed");
    assert_eq!(session.entity_name(entity.id).unwrap(), "Renamed");
    assert_eq!(session.find_entity("Renamed").unwrap().map(|e| e.id), Some(entity.id));
}

#[test]
fn reparent_rejects_cycles() {
    let mut session = session();
    let parent = session.create_entity(Some("Parent"), None, None).unwrap();
    let child = session.create_entity(Some("Child"), Some(&parent), None).unwrap();

    let err = session.reparent_entity(&parent, Some(&child)).unwrap_err();
    assert!(matches!(err.engine_kind(), Some(ErrorKind::ReparentCycle { .. })));

    session.reparent_entity(&child, None).unwrap();
    let root = session.level_root().unwrap();
    assert_eq!(session.entity_parent(child.id).unwrap(), Some(root.id));
}

// =============================================================================
// Components
// =============================================================================

#[test]
fn unknown_component_type_is_an_error() {
    let mut session = session();
    let entity = session.create_entity(None, None, None).unwrap();
    let err = session.add_component(&entity, "Flux Capacitor").unwrap_err();
    assert!(matches!(err.engine_kind(), Some(ErrorKind::UnknownComponentType(_))));
}

#[test]
fn collider_without_a_shape_is_missing_a_service() {
    let mut session = session();
    let entity = session.create_entity(None, None, None).unwrap();
    let err = session.add_component(&entity, "PhysX Shape Collider").unwrap_err();
    assert!(matches!(err.engine_kind(), Some(ErrorKind::MissingService { .. })));

    session.add_component(&entity, "Sphere Shape").unwrap();
    assert!(session.add_component(&entity, "PhysX Shape Collider").is_ok());
    assert_eq!(session.components(&entity).unwrap().len(), 2);
}

#[test]
fn field_writes_are_checked_against_the_schema() {
    let mut session = session();
    let entity = session.create_entity(None, None, None).unwrap();
    let sphere = session.add_component(&entity, "Sphere Shape").unwrap();
    let radius = "Sphere Shape|Sphere Configuration|Radius";

    assert!(session.set_field(&sphere, radius, 2.0).unwrap());
    assert_eq!(session.get_field::<f64>(&sphere, radius).unwrap(), 2.0);
    assert!(!session.set_field(&sphere, radius, "wide").unwrap());
    assert!(!session.set_field(&sphere, "Sphere Shape|Nope", 1.0).unwrap());
    assert_eq!(session.get_field::<f64>(&sphere, radius).unwrap(), 2.0);
}

#[test]
fn find_component_by_type() {
    let mut session = session();
    let entity = session.create_entity(None, None, None).unwrap();
    assert!(session.find_component(&entity, "Comment").unwrap().is_none());

    let comment = session.add_component(&entity, "Comment").unwrap();
    let found = session.find_component(&entity, "Comment").unwrap();
    assert_eq!(found, Some(comment.clone()));
    assert_eq!(comment.entity(), entity.id);

    session.remove_component(&comment).unwrap();
    assert!(!session.has_component(&entity, "Comment").unwrap());
}

// =============================================================================
// Prefabs
// =============================================================================

#[test]
fn created_prefab_keeps_argument_order() {
    let mut session = session();
    let first = session.create_entity(Some("First"), None, None).unwrap();
    let second = session.create_entity(Some("Second"), None, None).unwrap();

    let (template, instance) = session
        .create_prefab(&[second.clone(), first.clone()], "pair")
        .unwrap();
    assert_eq!(template, PrefabTemplate::new("pair"));
    assert_eq!(instance.child_ids(), vec![second.id, first.id]);
    assert!(session.is_instance(instance.id()).unwrap());
    assert_eq!(session.owning_instance(first.id).unwrap(), instance.id());
    assert!(session
        .validate_hierarchy(&instance, &[ExpectedTree::leaf("Second"), ExpectedTree::leaf("First")])
        .unwrap());
}

#[test]
fn template_paths_are_not_overwritten() {
    let mut session = session();
    let first = session.create_entity(None, None, None).unwrap();
    let second = session.create_entity(None, None, None).unwrap();
    session.create_prefab(&[first], "taken").unwrap();

    let err = session.create_prefab(&[second], "taken").unwrap_err();
    assert!(matches!(err.engine_kind(), Some(ErrorKind::TemplateWriteFailed { .. })));
}

#[test]
fn instantiated_copies_share_a_template() {
    let mut session = session();
    let entity = session.create_entity(Some("Part"), None, None).unwrap();
    let (template, original) = session.create_prefab(&[entity], "part").unwrap();

    let position = Vec3::new(5.0, 0.0, 0.0);
    let copy = session.instantiate_prefab(&template, None, Some(position)).unwrap();
    assert_ne!(copy.id(), original.id());
    assert_eq!(copy.template, template);
    assert_eq!(copy.direct_children.len(), 1);
    assert_eq!(copy.direct_children[0].name, "Part");
    assert!(session.world_position(copy.id()).unwrap().is_close(position, Vec3::TOLERANCE));
}

#[test]
fn missing_template_cannot_be_instantiated() {
    let mut session = session();
    let err = session
        .instantiate_prefab(&PrefabTemplate::new("nowhere"), None, None)
        .unwrap_err();
    assert!(matches!(err.engine_kind(), Some(ErrorKind::TemplateNotFound(_))));
}

#[test]
fn mismatched_hierarchy_names_the_problem() {
    let mut session = session();
    let entity = session.create_entity(Some("Actual"), None, None).unwrap();
    let (_, instance) = session.create_prefab(&[entity], "mismatch").unwrap();

    assert!(!session
        .validate_hierarchy(&instance, &[ExpectedTree::leaf("Expected")])
        .unwrap());
    let lines = session.reporter().lines();
    assert!(lines.iter().any(|l| l.contains("Actual found where Expected was expected")));
    assert_eq!(lines.last().map(String::as_str), Some("Prefab hierarchy does not match"));
    assert!(!session.reporter().passed());
}

#[test]
fn focus_moves_between_level_and_instance() {
    let mut session = session();
    let root = session.level_root().unwrap();
    let entity = session.create_entity(None, None, None).unwrap();
    let loose = session.create_entity(Some("Loose"), None, None).unwrap();
    let (_, instance) = session.create_prefab(&[entity], "focusable").unwrap();

    assert_eq!(session.focused_prefab().unwrap(), root.id);
    assert!(session.focus_prefab(&instance).unwrap());
    assert_eq!(session.focused_prefab().unwrap(), instance.id());
    assert!(!session.focus_prefab(&instance).unwrap());

    assert!(session.focus_on_owning_prefab(&loose).unwrap());
    assert_eq!(session.focused_prefab().unwrap(), root.id);
}

#[test]
fn entities_cannot_leave_an_unfocused_instance() {
    let mut session = session();
    let entity = session.create_entity(Some("Inside"), None, None).unwrap();
    let (_, instance) = session.create_prefab(&[entity.clone()], "sealed").unwrap();

    let err = session.reparent_entity(&entity, None).unwrap_err();
    assert!(matches!(err.engine_kind(), Some(ErrorKind::NotFocused { .. })));
    assert_eq!(session.entity_children(instance.id()).unwrap(), vec![entity.id]);
    assert!(!session.is_prefab_modified(&instance).unwrap());
}
