//! Prefab facade.
//!
//! Prefab instances are values: a container handle, the template it came
//! from, and a snapshot of its direct children. Every operation that edits
//! the scene returns only after propagation settled, so the next statement
//! observes the result, undo history included.

use stagehand_foundation::names::{asset, entity, prefab};
use stagehand_foundation::{AssetId, EntityId, Value, Vec3};
use tracing::{debug, info, warn};

use crate::entity::EntityHandle;
use crate::error::HarnessResult;
use crate::session::Session;

/// A persisted prefab template.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrefabTemplate {
    /// Path under the content tree.
    pub path: String,
}

impl PrefabTemplate {
    /// Names an existing template.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// A live instance of a template, rooted at its container entity.
#[derive(Clone, Debug)]
pub struct PrefabInstance {
    /// The synthetic container entity.
    pub container: EntityHandle,
    /// The template the instance was made from.
    pub template: PrefabTemplate,
    /// Direct children of the container when the instance was last read.
    pub direct_children: Vec<EntityHandle>,
}

impl PrefabInstance {
    /// The container's engine id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.container.id
    }

    /// Ids of the cached direct children.
    #[must_use]
    pub fn child_ids(&self) -> Vec<EntityId> {
        self.direct_children.iter().map(|c| c.id).collect()
    }
}

impl PartialEq for PrefabInstance {
    fn eq(&self, other: &Self) -> bool {
        self.container == other.container
    }
}

impl Eq for PrefabInstance {}

impl Session {
    /// Waits for the propagation an edit started; a timeout is reported but
    /// not fatal.
    fn settle(&mut self, operation: &str) -> HarnessResult<()> {
        if !self.wait_for_propagation()? {
            warn!(operation, "propagation_unsettled");
            self.info(format_args!("Propagation did not finish after {operation}"));
        }
        Ok(())
    }

    /// Reads the current state of the instance rooted at `container`.
    ///
    /// # Errors
    ///
    /// Returns `NotAnInstance` if `container` is not an instance container.
    pub fn prefab_instance(&mut self, container: EntityId) -> HarnessResult<PrefabInstance> {
        let path: String = self.broadcast(
            prefab::BUS,
            prefab::GET_TEMPLATE_PATH,
            &[Value::from(container)],
        )?;
        let container = self.entity_handle(container)?;
        let direct_children = self.child_handles(container.id)?;
        Ok(PrefabInstance {
            container,
            template: PrefabTemplate::new(path),
            direct_children,
        })
    }

    fn child_handles(&mut self, id: EntityId) -> HarnessResult<Vec<EntityHandle>> {
        self.entity_children(id)?
            .into_iter()
            .map(|child| self.entity_handle(child))
            .collect()
    }

    /// Packages `entities` and their descendants into a template at `path`.
    /// The entities keep their ids and become the instance's content, in
    /// argument order.
    ///
    /// # Errors
    ///
    /// Returns `TemplateWriteFailed` if the template cannot be written, or
    /// `NotFocused` if the entities' prefab is not focused.
    pub fn create_prefab(
        &mut self,
        entities: &[EntityHandle],
        path: &str,
    ) -> HarnessResult<(PrefabTemplate, PrefabInstance)> {
        let ids: Vec<EntityId> = entities.iter().map(|e| e.id).collect();
        let args = [Value::from(ids), Value::from(path)];
        let container: EntityId = self.broadcast(prefab::BUS, prefab::CREATE_PREFAB, &args)?;
        self.settle("create_prefab")?;
        let instance = self.prefab_instance(container)?;
        info!(path, container = %instance.container, "prefab_created");
        Ok((instance.template.clone(), instance))
    }

    /// Creates a fresh instance of `template` under `parent` (the level root
    /// when `None`) at world `position` (the origin when `None`).
    ///
    /// # Errors
    ///
    /// Returns `TemplateNotFound` or `NotFocused`.
    pub fn instantiate_prefab(
        &mut self,
        template: &PrefabTemplate,
        parent: Option<&EntityHandle>,
        position: Option<Vec3>,
    ) -> HarnessResult<PrefabInstance> {
        let args = [
            Value::from(template.path.as_str()),
            Value::from(parent.map(|p| p.id)),
            Value::from(position),
        ];
        let container: EntityId = self.broadcast(prefab::BUS, prefab::INSTANTIATE, &args)?;
        self.settle("instantiate_prefab")?;
        debug!(path = %template.path, %container, "prefab_instantiated");
        self.prefab_instance(container)
    }

    /// Moves the instance under `parent`. The prefab owning `parent` must be
    /// focused.
    ///
    /// # Errors
    ///
    /// Returns `NotFocused` or `ReparentCycle`.
    pub fn reparent_instance(
        &mut self,
        instance: &mut PrefabInstance,
        parent: &EntityHandle,
    ) -> HarnessResult<()> {
        let args = [Value::from(parent.id)];
        self.event::<()>(entity::BUS, entity::SET_PARENT, instance.id(), &args)?;
        self.settle("reparent_instance")?;
        instance.container.parent = Some(parent.id);
        Ok(())
    }

    /// Dissolves the instance; the container becomes a plain entity.
    ///
    /// # Errors
    ///
    /// Returns `NotAnInstance` or `NotFocused`.
    pub fn detach_prefab(&mut self, instance: PrefabInstance) -> HarnessResult<EntityHandle> {
        let args = [Value::from(instance.id())];
        self.broadcast::<()>(prefab::BUS, prefab::DETACH, &args)?;
        self.settle("detach_prefab")?;
        Ok(instance.container)
    }

    /// Deletes the container and everything in it. Returns the removed ids.
    ///
    /// # Errors
    ///
    /// Returns `NotAnInstance` or `NotFocused`.
    pub fn remove_prefab(&mut self, instance: PrefabInstance) -> HarnessResult<Vec<EntityId>> {
        let args = [Value::from(instance.id())];
        let removed: Vec<EntityId> =
            self.broadcast(prefab::BUS, prefab::REMOVE_INSTANCE, &args)?;
        self.settle("remove_prefab")?;
        Ok(removed)
    }

    /// Copies the instance next to the original, under the same parent.
    ///
    /// # Errors
    ///
    /// Returns `NotAnInstance` or `NotFocused`.
    pub fn duplicate_prefab(&mut self, instance: &PrefabInstance) -> HarnessResult<PrefabInstance> {
        let args = [Value::from(instance.id())];
        let copy: EntityId = self.broadcast(prefab::BUS, prefab::DUPLICATE, &args)?;
        self.settle("duplicate_prefab")?;
        self.prefab_instance(copy)
    }

    /// Focuses the instance for editing. Returns false if it already was.
    ///
    /// # Errors
    ///
    /// Returns `NotAnInstance` for stale instances.
    pub fn focus_prefab(&mut self, instance: &PrefabInstance) -> HarnessResult<bool> {
        Ok(self.broadcast(
            prefab::BUS,
            prefab::FOCUS_INSTANCE,
            &[Value::from(instance.id())],
        )?)
    }

    /// Focuses the prefab that owns `handle`, or the level itself.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for stale handles.
    pub fn focus_on_owning_prefab(&mut self, handle: &EntityHandle) -> HarnessResult<bool> {
        Ok(self.broadcast(
            prefab::BUS,
            prefab::FOCUS_ON_OWNING_PREFAB,
            &[Value::from(handle.id)],
        )?)
    }

    /// The focused container, or the level root.
    ///
    /// # Errors
    ///
    /// Returns `NoLevelLoaded` if no level is open.
    pub fn focused_prefab(&mut self) -> HarnessResult<EntityId> {
        Ok(self.broadcast(prefab::BUS, prefab::GET_FOCUSED_INSTANCE, &[])?)
    }

    /// The container owning `id`, or the level root.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn owning_instance(&mut self, id: EntityId) -> HarnessResult<EntityId> {
        Ok(self.broadcast(
            prefab::BUS,
            prefab::GET_OWNING_INSTANCE,
            &[Value::from(id)],
        )?)
    }

    /// True if `id` is an instance container.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn is_instance(&mut self, id: EntityId) -> HarnessResult<bool> {
        Ok(self.broadcast(
            prefab::BUS,
            prefab::IS_INSTANCE_CONTAINER,
            &[Value::from(id)],
        )?)
    }

    /// The container's current direct children, in order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the container is gone.
    pub fn direct_children(&mut self, instance: &PrefabInstance) -> HarnessResult<Vec<EntityHandle>> {
        self.child_handles(instance.id())
    }

    /// Re-reads the container and its direct children into `instance`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the container is gone.
    pub fn refresh_instance(&mut self, instance: &mut PrefabInstance) -> HarnessResult<()> {
        instance.container = self.entity_handle(instance.id())?;
        instance.direct_children = self.child_handles(instance.id())?;
        Ok(())
    }

    /// Writes the instance's local edits back to its template; other
    /// unmodified instances pick them up when propagation ends.
    ///
    /// # Errors
    ///
    /// Returns `NotAnInstance` or `TemplateWriteFailed`.
    pub fn save_overrides(&mut self, instance: &PrefabInstance) -> HarnessResult<()> {
        let args = [Value::from(instance.id())];
        self.broadcast::<()>(prefab::BUS, prefab::SAVE_OVERRIDES, &args)?;
        self.settle("save_overrides")
    }

    /// True while the instance has unsaved edits.
    ///
    /// # Errors
    ///
    /// Returns `NotAnInstance` for stale instances.
    pub fn is_prefab_modified(&mut self, instance: &PrefabInstance) -> HarnessResult<bool> {
        Ok(self.broadcast(
            prefab::BUS,
            prefab::IS_MODIFIED,
            &[Value::from(instance.id())],
        )?)
    }

    // --- Assets ---

    /// Catalog id for `path`; invalid until the asset finished processing.
    ///
    /// # Errors
    ///
    /// Returns an error only when the editor is unreachable.
    pub fn asset_id(&mut self, path: &str) -> HarnessResult<AssetId> {
        Ok(self.broadcast(asset::BUS, asset::GET_ID_BY_PATH, &[Value::from(path)])?)
    }

    /// True if `id` names a registered asset.
    ///
    /// # Errors
    ///
    /// Returns an error only when the editor is unreachable.
    pub fn is_asset_valid(&mut self, id: AssetId) -> HarnessResult<bool> {
        Ok(self.broadcast(asset::BUS, asset::IS_VALID, &[Value::from(id)])?)
    }
}
