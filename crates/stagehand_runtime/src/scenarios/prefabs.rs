use std::collections::BTreeSet;

use stagehand_foundation::{EntityId, Vec3};
use stagehand_harness::{
    ExpectedTree, HarnessResult, LabelPair, Scenario, ScenarioConfig, Session,
};

const SINGLE_CHILD: LabelPair = LabelPair::fixed(
    "Prefab instance holds the original entity",
    "Prefab instance does not hold the original entity",
);
const NAME_KEPT: LabelPair = LabelPair::fixed(
    "Prefab content kept the entity name",
    "Prefab content lost the entity name",
);
const COLLIDER_KEPT: LabelPair = LabelPair::fixed(
    "Prefab content kept the collider",
    "Prefab content lost the collider",
);
const ASSET_REGISTERED: LabelPair = LabelPair::fixed(
    "Prefab asset registered",
    "Prefab asset not registered",
);
const ENTITY_DELETED: LabelPair = LabelPair::fixed(
    "Entity deleted from the prefab instance",
    "Entity still in the prefab instance",
);
const INSTANCE_MODIFIED: LabelPair = LabelPair::fixed(
    "Prefab instance marked modified",
    "Prefab instance not marked modified",
);
const PARENT_HOLDS_INSTANCE: LabelPair = LabelPair::fixed(
    "Parent holds only the new instance",
    "Parent does not hold the new instance",
);
const OVERRIDES_SAVED: LabelPair = LabelPair::fixed(
    "Saved instance is no longer modified",
    "Saved instance is still modified",
);
const OVERRIDES_PROPAGATED: LabelPair = LabelPair::fixed(
    "Other instance received the saved entity",
    "Other instance did not receive the saved entity",
);
const REMOVE_RESTORED: LabelPair = LabelPair::fixed(
    "Removing the instance restored the entity set",
    "Removing the instance left the entity set changed",
);
const DETACHED: LabelPair = LabelPair::fixed(
    "Detached container is a plain entity",
    "Detached container is still an instance",
);
const DETACHED_CONTENT: LabelPair = LabelPair::fixed(
    "Detached content survived under the level",
    "Detached content was lost",
);

/// Every entity id reachable from the level root.
fn all_ids(session: &mut Session) -> HarnessResult<BTreeSet<EntityId>> {
    let root = session.level_root()?;
    let mut ids = BTreeSet::new();
    let mut stack = vec![root.id];
    while let Some(id) = stack.pop() {
        ids.insert(id);
        stack.extend(session.entity_children(id)?);
    }
    Ok(ids)
}

/// Turns one entity with a collider into a prefab.
pub struct CreateSinglePrefab;

impl Scenario for CreateSinglePrefab {
    fn name(&self) -> &str {
        "create_single_prefab"
    }

    fn summary(&self) -> &str {
        "package one entity into a prefab, then undo and redo the creation"
    }

    fn run(&mut self, session: &mut Session, _config: &ScenarioConfig) -> HarnessResult<()> {
        let root = session.level_root()?;
        let mut entity = session.create_entity(None, None, None)?;
        session.set_entity_name(&mut entity, "TestEntity")?;
        session.add_component(&entity, "PhysX Primitive Collider")?;

        let (template, instance) = session.create_prefab(&[entity.clone()], "car_prefab")?;
        session.record(&SINGLE_CHILD, instance.child_ids() == vec![entity.id]);
        let content = instance.direct_children.first().cloned();
        session.record(
            &NAME_KEPT,
            content.as_ref().is_some_and(|c| c.name == "TestEntity"),
        );
        let has_collider = match &content {
            Some(content) => session.has_component(content, "PhysX Primitive Collider")?,
            None => false,
        };
        session.record(&COLLIDER_KEPT, has_collider);

        let asset = session.asset_id(&template.path)?;
        let registered = session.is_asset_valid(asset)?;
        session.record(&ASSET_REGISTERED, registered);

        session.validate_undo_redo_on_create(&instance, root.id)?;
        Ok(())
    }
}

/// Packages a three-deep chain and moves it as one.
pub struct CreateNestedPrefab;

impl Scenario for CreateNestedPrefab {
    fn name(&self) -> &str {
        "create_nested_prefab"
    }

    fn summary(&self) -> &str {
        "a nested chain keeps its shape and moves together inside a prefab"
    }

    fn run(&mut self, session: &mut Session, _config: &ScenarioConfig) -> HarnessResult<()> {
        let origin = Vec3::splat(100.0);
        let e0 = session.create_entity(Some("E0"), None, Some(origin))?;
        let e1 = session.create_entity(Some("E1"), Some(&e0), Some(origin))?;
        session.create_entity(Some("E2"), Some(&e1), Some(origin))?;

        let (_, instance) = session.create_prefab(&[e0], "nested")?;
        let Some(top) = instance.direct_children.first().cloned() else {
            session.critical(&SINGLE_CHILD, false)?;
            return Ok(());
        };
        session.validate_linear_nested(&top, 3, origin)?;

        let moved = Vec3::splat(200.0);
        session.set_world_position(top.id, moved)?;
        session.wait_for_propagation()?;
        session.validate_linear_nested(&top, 3, moved)?;

        session.validate_hierarchy(&instance, &[ExpectedTree::chain(&["E0", "E1", "E2"])])?;
        Ok(())
    }
}

/// Deletes the only entity of a focused prefab instance.
pub struct DeleteEntityInPrefab;

impl Scenario for DeleteEntityInPrefab {
    fn name(&self) -> &str {
        "delete_entity_in_prefab"
    }

    fn summary(&self) -> &str {
        "focus a prefab and delete its content"
    }

    fn run(&mut self, session: &mut Session, _config: &ScenarioConfig) -> HarnessResult<()> {
        let entity = session.create_entity(None, None, None)?;
        let (_, mut instance) = session.create_prefab(&[entity], "some_prefab")?;
        let Some(child) = instance.direct_children.first().cloned() else {
            session.critical(&SINGLE_CHILD, false)?;
            return Ok(());
        };

        session.focus_prefab(&instance)?;
        session.delete_entity(&child)?;
        session.wait_for_propagation()?;
        session.refresh_instance(&mut instance)?;
        session.record(&ENTITY_DELETED, instance.direct_children.is_empty());
        let modified = session.is_prefab_modified(&instance)?;
        session.record(&INSTANCE_MODIFIED, modified);
        Ok(())
    }
}

/// Duplicates an instance under a parent, then undoes and redoes it.
pub struct DuplicatePrefabUndoRedo;

impl Scenario for DuplicatePrefabUndoRedo {
    fn name(&self) -> &str {
        "duplicate_prefab_undo_redo"
    }

    fn summary(&self) -> &str {
        "duplicating an instance is one undo step"
    }

    fn run(&mut self, session: &mut Session, _config: &ScenarioConfig) -> HarnessResult<()> {
        let parent = session.create_entity(Some("P"), None, None)?;
        let entity = session.create_entity(None, Some(&parent), None)?;
        let (_, instance) = session.create_prefab(&[entity], "dup_prefab")?;

        let children = session.entity_children(parent.id)?;
        session.critical(&PARENT_HOLDS_INSTANCE, children == vec![instance.id()])?;

        let duplicate = session.duplicate_prefab(&instance)?;
        session.validate_undo_redo_on_duplicate(&instance, &duplicate, parent.id)?;
        Ok(())
    }
}

/// Saves overrides from one instance and checks they reach another.
pub struct SavePrefabOverrides;

impl Scenario for SavePrefabOverrides {
    fn name(&self) -> &str {
        "save_prefab_overrides"
    }

    fn summary(&self) -> &str {
        "overrides saved on one instance propagate to an unmodified one"
    }

    fn run(&mut self, session: &mut Session, _config: &ScenarioConfig) -> HarnessResult<()> {
        let wheel = session.create_entity(Some("Wheel"), None, None)?;
        let (template, edited) = session.create_prefab(&[wheel], "wheel_assembly")?;
        let other = session.instantiate_prefab(&template, None, Some(Vec3::new(5.0, 0.0, 0.0)))?;

        session.focus_prefab(&edited)?;
        session.create_entity(Some("Extra"), Some(&edited.container), None)?;
        session.save_overrides(&edited)?;
        let modified = session.is_prefab_modified(&edited)?;
        session.record(&OVERRIDES_SAVED, !modified);

        let names: Vec<String> = session
            .direct_children(&other)?
            .into_iter()
            .map(|child| child.name)
            .collect();
        session.record(&OVERRIDES_PROPAGATED, names == ["Wheel", "Extra"]);
        Ok(())
    }
}

/// Removes a fresh instance, then detaches the original.
pub struct DetachAndRemovePrefab;

impl Scenario for DetachAndRemovePrefab {
    fn name(&self) -> &str {
        "detach_and_remove_prefab"
    }

    fn summary(&self) -> &str {
        "removing an instance deletes only its entities; detaching keeps them"
    }

    fn run(&mut self, session: &mut Session, _config: &ScenarioConfig) -> HarnessResult<()> {
        let root = session.level_root()?;
        let entity = session.create_entity(Some("Crate"), None, None)?;
        let (template, original) = session.create_prefab(&[entity.clone()], "crate_prefab")?;

        let before = all_ids(session)?;
        let copy = session.instantiate_prefab(&template, None, Some(Vec3::splat(3.0)))?;
        session.remove_prefab(copy)?;
        let after = all_ids(session)?;
        session.record(&REMOVE_RESTORED, after == before);

        let container = session.detach_prefab(original)?;
        let still_instance = session.is_instance(container.id)?;
        session.record(&DETACHED, !still_instance);
        let survived = session.is_valid(entity.id)?
            && session.owning_instance(entity.id)? == root.id;
        session.record(&DETACHED_CONTENT, survived);
        Ok(())
    }
}
