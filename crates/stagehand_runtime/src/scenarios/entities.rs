use stagehand_foundation::{EntityId, Vec3};
use stagehand_harness::{HarnessResult, LabelPair, Scenario, ScenarioConfig, Session};

const POSITIONED: LabelPair = LabelPair::fixed(
    "Entity created at the requested position",
    "Entity created at the wrong position",
);
const UNDER_ROOT: LabelPair = LabelPair::fixed(
    "Entity parented to the level root",
    "Entity not parented to the level root",
);
const RENAMED: LabelPair = LabelPair::fixed(
    "Entity renamed to TestEntity",
    "Entity rename failed",
);
const REPARENTED: LabelPair = LabelPair::fixed(
    "Entity reparented",
    "Entity reparent failed",
);
const REPARENT_UNDONE: LabelPair = LabelPair::fixed(
    "Reparent undone",
    "Reparent undo failed",
);
const WORLD_KEPT: LabelPair = LabelPair::fixed(
    "Reparent kept the world position",
    "Reparent moved the entity",
);
const TO_ROOT: LabelPair = LabelPair::fixed(
    "Entity moved back to the level root",
    "Entity not moved back to the level root",
);

/// Creates an unnamed entity under the level root and renames it.
pub struct CreateEntityUnderRoot;

impl Scenario for CreateEntityUnderRoot {
    fn name(&self) -> &str {
        "create_entity_under_root"
    }

    fn summary(&self) -> &str {
        "create an entity at (100, 100, 100) and check name, position and parent"
    }

    fn run(&mut self, session: &mut Session, _config: &ScenarioConfig) -> HarnessResult<()> {
        let root = session.level_root()?;
        let position = Vec3::splat(100.0);
        let mut entity = session.create_entity(None, None, Some(position))?;

        let created = LabelPair::new(
            format!("{} created", entity.name),
            format!("{} creation failed", entity.name),
        );
        let found = session.find_entity(&entity.name)?;
        let valid = session.is_valid(entity.id)?;
        session.critical(&created, valid && found.as_ref() == Some(&entity))?;

        let actual = session.world_position(entity.id)?;
        session.record(&POSITIONED, actual.is_close(position, Vec3::TOLERANCE));
        let under_root = parent_is(session, entity.id, root.id)?;
        session.record(&UNDER_ROOT, under_root);

        session.set_entity_name(&mut entity, "TestEntity")?;
        let found = session.find_entity("TestEntity")?;
        session.record(&RENAMED, found == Some(entity));
        Ok(())
    }
}

fn parent_is(session: &mut Session, id: EntityId, parent: EntityId) -> HarnessResult<bool> {
    Ok(session.entity_parent(id)? == Some(parent))
}

/// Reparents an entity, undoes it, and moves it back to the root.
pub struct ReparentEntity;

impl Scenario for ReparentEntity {
    fn name(&self) -> &str {
        "reparent_entity"
    }

    fn summary(&self) -> &str {
        "reparent keeps world position and undoes as one step"
    }

    fn run(&mut self, session: &mut Session, _config: &ScenarioConfig) -> HarnessResult<()> {
        let root = session.level_root()?;
        let parent = session.create_entity(Some("Parent"), None, Some(Vec3::new(10.0, 0.0, 0.0)))?;
        let child = session.create_entity(Some("Child"), None, Some(Vec3::new(0.0, 5.0, 0.0)))?;

        session.reparent_entity(&child, Some(&parent))?;
        session.wait_for_propagation()?;
        let reparented = parent_is(session, child.id, parent.id)?;
        session.record(&REPARENTED, reparented);
        let world = session.world_position(child.id)?;
        session.record(&WORLD_KEPT, world.is_close(Vec3::new(0.0, 5.0, 0.0), Vec3::TOLERANCE));

        session.undo()?;
        let undone = parent_is(session, child.id, root.id)?;
        session.record(&REPARENT_UNDONE, undone);

        session.redo()?;
        session.reparent_entity(&child, None)?;
        session.wait_for_propagation()?;
        let at_root = parent_is(session, child.id, root.id)?;
        session.record(&TO_ROOT, at_root);
        Ok(())
    }
}
