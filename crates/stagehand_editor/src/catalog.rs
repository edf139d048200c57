//! Component types the editor knows about.

use stagehand_foundation::{AssetId, ComponentTypeId, Result, Vec3};
use stagehand_storage::{ComponentSchema, FieldSchema, World};

/// Service provided by shape components. Only one may be active per entity.
pub const SHAPE_SERVICE: &str = "ShapeService";
/// Service provided by colliders.
pub const COLLIDER_SERVICE: &str = "ColliderService";
/// Service provided by rigid bodies. Only one may be active per entity.
pub const RIGID_BODY_SERVICE: &str = "RigidBodyService";

fn shape(id: u32, name: &str) -> ComponentSchema {
    ComponentSchema::new(ComponentTypeId(id), name)
        .providing(SHAPE_SERVICE)
        .incompatible_with(SHAPE_SERVICE)
}

fn rigid_body(id: u32, name: &str) -> ComponentSchema {
    ComponentSchema::new(ComponentTypeId(id), name)
        .providing(RIGID_BODY_SERVICE)
        .incompatible_with(RIGID_BODY_SERVICE)
}

/// Builds the built-in component schemas.
///
/// # Errors
///
/// Returns an error if a field path literal is malformed.
pub fn builtin_schemas() -> Result<Vec<ComponentSchema>> {
    Ok(vec![
        shape(1, "Box Shape").with_field(FieldSchema::new(
            "Box Shape|Box Configuration|Dimensions",
            Vec3::splat(1.0),
        )?),
        shape(2, "Cylinder Shape")
            .with_field(FieldSchema::new(
                "Cylinder Shape|Cylinder Configuration|Radius",
                0.5,
            )?)
            .with_field(FieldSchema::new(
                "Cylinder Shape|Cylinder Configuration|Height",
                1.0,
            )?),
        shape(3, "Sphere Shape").with_field(FieldSchema::new(
            "Sphere Shape|Sphere Configuration|Radius",
            0.5,
        )?),
        shape(4, "Capsule Shape")
            .with_field(FieldSchema::new(
                "Capsule Shape|Capsule Configuration|Radius",
                0.25,
            )?)
            .with_field(FieldSchema::new(
                "Capsule Shape|Capsule Configuration|Height",
                1.0,
            )?),
        ComponentSchema::new(ComponentTypeId(10), "PhysX Primitive Collider")
            .providing(COLLIDER_SERVICE)
            .with_field(FieldSchema::new("Collider Configuration|Trigger", false)?)
            .with_field(FieldSchema::new(
                "Collider Configuration|Collision Layer",
                "Default",
            )?)
            .with_field(FieldSchema::new("Shape Configuration|Shape", "Box")?)
            .with_field(FieldSchema::new(
                "Shape Configuration|Box|Dimensions",
                Vec3::splat(1.0),
            )?),
        ComponentSchema::new(ComponentTypeId(11), "PhysX Shape Collider")
            .providing(COLLIDER_SERVICE)
            .requiring(SHAPE_SERVICE)
            .with_field(FieldSchema::new("Collider Configuration|Trigger", false)?)
            .with_field(FieldSchema::new(
                "Collider Configuration|Collision Layer",
                "Default",
            )?),
        rigid_body(20, "PhysX Dynamic Rigid Body")
            .with_field(FieldSchema::new("Configuration|Mass", 1.0)?)
            .with_field(FieldSchema::new("Configuration|Gravity Enabled", true)?)
            .with_field(FieldSchema::new(
                "Configuration|Initial linear velocity",
                Vec3::ZERO,
            )?),
        rigid_body(21, "PhysX Static Rigid Body"),
        ComponentSchema::new(ComponentTypeId(30), "Mesh").with_field(FieldSchema::new(
            "Controller|Configuration|Mesh Asset",
            AssetId::INVALID,
        )?),
        ComponentSchema::new(ComponentTypeId(31), "Comment")
            .with_field(FieldSchema::new("Configuration|Comment", "")?),
        // Layers are ordinary entities carrying this component.
        ComponentSchema::new(ComponentTypeId(32), "Editor Layer")
            .permanent()
            .with_field(FieldSchema::new("Layer|Overwrite Prefabs", false)?)
            .with_field(FieldSchema::new("Layer|Color", Vec3::splat(1.0))?),
    ])
}

/// Returns an empty world with every built-in component type registered.
///
/// # Errors
///
/// Returns an error if the built-in schemas fail to register.
pub fn builtin_world() -> Result<World> {
    builtin_schemas()?
        .into_iter()
        .try_fold(World::new(), |world, schema| world.register_component(schema))
}
