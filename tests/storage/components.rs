//! Integration tests for component schemas, conflicts, and fields

use stagehand_foundation::{ComponentTypeId, ErrorKind, FieldPath, Value, Vec3};
use stagehand_storage::{ComponentSchema, FieldSchema, World};

fn shape(id: u32, name: &str) -> ComponentSchema {
    ComponentSchema::new(ComponentTypeId(id), name)
        .providing("shape")
        .incompatible_with("shape")
}

fn world() -> World {
    let schemas = [
        shape(1, "Box").with_field(FieldSchema::new("Box|Dimensions", Vec3::splat(1.0)).unwrap()),
        shape(2, "Cylinder").with_field(FieldSchema::new("Cylinder|Radius", 0.5).unwrap()),
        ComponentSchema::new(ComponentTypeId(3), "Shape Collider")
            .requiring("shape")
            .with_field(FieldSchema::new("Collider|Trigger", false).unwrap()),
        ComponentSchema::new(ComponentTypeId(4), "Layer").permanent(),
    ];
    schemas
        .into_iter()
        .fold(World::new(), |world, schema| world.register_component(schema).unwrap())
}

fn path(raw: &str) -> FieldPath {
    FieldPath::parse(raw).unwrap()
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn duplicate_registration_is_refused() {
    let world = world();
    assert!(world.register_component(shape(1, "Box")).is_err());
    assert!(world.register_component(shape(9, "Box")).is_err());
}

#[test]
fn unknown_type_is_reported_by_name() {
    let (world, e) = world().spawn("e", None, Vec3::ZERO, None).unwrap();
    let err = world.add_component(e, "Teapot").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownComponentType(ref name) if name == "Teapot"));
}

// =============================================================================
// Conflicts and Services
// =============================================================================

#[test]
fn conflicting_component_starts_pending_and_swaps_on_activation() {
    let (world, e) = world().spawn("e", None, Vec3::ZERO, None).unwrap();
    let (world, boxed) = world.add_component(e, "Box").unwrap();
    let (world, cylinder) = world.add_component(e, "Cylinder").unwrap();
    assert!(world.components().is_enabled(boxed).unwrap());
    assert!(!world.components().is_enabled(cylinder).unwrap());

    let world = world.activate_component(cylinder).unwrap();
    assert!(world.components().is_enabled(cylinder).unwrap());
    assert!(!world.components().is_enabled(boxed).unwrap());

    let world = world.remove_component(cylinder).unwrap();
    assert!(world.components().is_enabled(boxed).unwrap());
}

#[test]
fn required_service_must_be_enabled() {
    let (world, e) = world().spawn("e", None, Vec3::ZERO, None).unwrap();
    let err = world.add_component(e, "Shape Collider").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingService { .. }));

    let (world, _) = world.add_component(e, "Box").unwrap();
    assert!(world.add_component(e, "Shape Collider").is_ok());
}

#[test]
fn permanent_components_cannot_be_removed() {
    let (world, e) = world().spawn("e", None, Vec3::ZERO, None).unwrap();
    let (world, layer) = world.add_component(e, "Layer").unwrap();
    let err = world.remove_component(layer).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotPermitted { .. }));
}

// =============================================================================
// Fields
// =============================================================================

#[test]
fn fields_start_at_defaults() {
    let (world, e) = world().spawn("e", None, Vec3::ZERO, None).unwrap();
    let (world, c) = world.add_component(e, "Cylinder").unwrap();
    assert_eq!(world.get_field(c, &path("Cylinder.Radius")).unwrap(), Value::Float(0.5));
}

#[test]
fn int_widens_into_float_field() {
    let (world, e) = world().spawn("e", None, Vec3::ZERO, None).unwrap();
    let (world, c) = world.add_component(e, "Cylinder").unwrap();
    let world = world.set_field(c, &path("Cylinder|Radius"), Value::Int(2)).unwrap();
    assert_eq!(world.get_field(c, &path("Cylinder|Radius")).unwrap(), Value::Float(2.0));
}

#[test]
fn wrong_type_and_unknown_path_are_refused() {
    let (world, e) = world().spawn("e", None, Vec3::ZERO, None).unwrap();
    let (world, c) = world.add_component(e, "Box").unwrap();

    let err = world
        .set_field(c, &path("Box|Dimensions"), Value::from("big"))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));

    let err = world.get_field(c, &path("Box|Depth")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::FieldNotFound { .. }));
}

#[test]
fn destroying_an_entity_drops_its_components() {
    let (world, e) = world().spawn("e", None, Vec3::ZERO, None).unwrap();
    let (world, c) = world.add_component(e, "Box").unwrap();
    let (world, _) = world.destroy(e).unwrap();
    assert!(world.components().get(c).is_none());
    assert!(world.components().list(e).is_empty());
}
