//! Entity and component operations.

use stagehand_foundation::names::notify;
use stagehand_foundation::{
    Address, ComponentRef, EntityId, Error, ErrorKind, FieldPath, Result, Value, Vec3,
};
use tracing::{debug, info};

use crate::editor::Editor;

// =============================================================================
// Entities
// =============================================================================

impl Editor {
    /// Creates an entity under `parent` (the level root when `None`) at world
    /// `position` (the origin when `None`). Unnamed entities get `EntityN`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for a dead parent and `NotFocused` when the
    /// parent's prefab is not focused.
    pub fn create_entity(
        &mut self,
        name: Option<&str>,
        parent: Option<EntityId>,
        position: Option<Vec3>,
    ) -> Result<EntityId> {
        let mut next = self.scene()?.clone();
        let parent = parent.unwrap_or(next.level_root);
        next.world.validate(parent)?;
        self.require_focus(&next, parent)?;

        let name = name.map_or_else(|| next.next_auto_name(), str::to_string);
        let local = position.unwrap_or(Vec3::ZERO) - next.world.world_translation(parent)?;
        let (world, entity) = next.world.spawn(&name, Some(parent), local, None)?;
        next.world = world;
        self.touch(&mut next, parent);
        self.commit("Create Entity", next)?;
        debug!(%entity, name = %name, %parent, "entity_created");
        Ok(entity)
    }

    /// Deletes an entity and its descendants. Returns the removed ids in
    /// pre-order.
    ///
    /// # Errors
    ///
    /// Returns `NotPermitted` for the level root and `NotFocused` when the
    /// parent's prefab is not focused.
    pub fn delete_entity(&mut self, entity: EntityId) -> Result<Vec<EntityId>> {
        let mut next = self.scene()?.clone();
        next.world.validate(entity)?;
        if entity == next.level_root {
            return Err(Error::new(ErrorKind::NotPermitted {
                entity,
                reason: "the level root cannot be deleted".into(),
            }));
        }
        let parent = next.world.parent(entity)?.unwrap_or(next.level_root);
        self.require_focus(&next, parent)?;

        let (world, removed) = next.world.destroy(entity)?;
        next.world = world;
        next.prune_links();
        if self.component_mode.is_some_and(|e| removed.contains(&e)) {
            self.component_mode = None;
        }
        self.touch(&mut next, parent);
        self.commit("Delete Entity", next)?;
        debug!(%entity, removed = removed.len(), "entity_deleted");
        Ok(removed)
    }

    /// First entity with this name in tree order.
    ///
    /// # Errors
    ///
    /// Returns `NoLevelLoaded` if no level is open.
    pub fn find_entity_by_name(&self, name: &str) -> Result<Option<EntityId>> {
        Ok(self.scene()?.world.find_by_name(name))
    }

    /// Returns true if `entity` is live in the open level.
    #[must_use]
    pub fn is_entity_valid(&self, entity: EntityId) -> bool {
        self.scene().is_ok_and(|s| s.world.exists(entity))
    }

    /// Root entity of the open level.
    ///
    /// # Errors
    ///
    /// Returns `NoLevelLoaded` if no level is open.
    pub fn level_root(&self) -> Result<EntityId> {
        Ok(self.scene()?.level_root)
    }

    /// Entity name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn entity_name(&self, entity: EntityId) -> Result<String> {
        Ok(self.scene()?.world.name(entity)?.to_string())
    }

    /// Renames an entity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn set_entity_name(&mut self, entity: EntityId, name: &str) -> Result<()> {
        let mut next = self.scene()?.clone();
        next.world = next.world.set_name(entity, name)?;
        self.touch(&mut next, entity);
        self.commit("Rename Entity", next)
    }

    /// Parent of an entity; `None` for the level root.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn entity_parent(&self, entity: EntityId) -> Result<Option<EntityId>> {
        self.scene()?.world.parent(entity)
    }

    /// Moves an entity under `parent` (the level root when `None`), keeping
    /// its world position.
    ///
    /// # Errors
    ///
    /// Returns `ReparentCycle` if `parent` is the entity or one of its
    /// descendants, `NotPermitted` for the level root, and `NotFocused` when
    /// the new parent's prefab is not focused or the entity would leave a
    /// prefab that neither is nor encloses the focused one.
    pub fn set_entity_parent(&mut self, entity: EntityId, parent: Option<EntityId>) -> Result<()> {
        let mut next = self.scene()?.clone();
        next.world.validate(entity)?;
        let parent = parent.unwrap_or(next.level_root);
        next.world.validate(parent)?;
        if entity == next.level_root {
            return Err(Error::new(ErrorKind::NotPermitted {
                entity,
                reason: "the level root cannot be reparented".into(),
            }));
        }
        let old_parent = next.world.parent(entity)?.unwrap_or(next.level_root);
        self.require_release(&next, old_parent)?;
        self.require_focus(&next, parent)?;

        next.world = next.world.reparent(entity, Some(parent), None)?;
        self.touch(&mut next, old_parent);
        self.touch(&mut next, parent);
        self.commit("Reparent Entity", next)?;
        debug!(%entity, %parent, "entity_reparented");
        Ok(())
    }

    /// Children in order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn entity_children(&self, entity: EntityId) -> Result<Vec<EntityId>> {
        self.scene()?.world.children(entity)
    }

    /// World-space translation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn world_translation(&self, entity: EntityId) -> Result<Vec3> {
        self.scene()?.world.world_translation(entity)
    }

    /// Moves an entity to a world-space position.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn set_world_translation(&mut self, entity: EntityId, position: Vec3) -> Result<()> {
        let mut next = self.scene()?.clone();
        next.world = next.world.set_world_translation(entity, position)?;
        self.touch(&mut next, entity);
        self.commit("Move Entity", next)
    }

    /// Translation relative to the parent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn local_translation(&self, entity: EntityId) -> Result<Vec3> {
        self.scene()?.world.local_translation(entity)
    }

    /// Sets the translation relative to the parent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn set_local_translation(&mut self, entity: EntityId, local: Vec3) -> Result<()> {
        let mut next = self.scene()?.clone();
        next.world = next.world.set_local_translation(entity, local)?;
        self.touch(&mut next, entity);
        self.commit("Move Entity", next)
    }
}

// =============================================================================
// Components
// =============================================================================

impl Editor {
    /// Adds a component by type name. It starts pending if it conflicts with
    /// an enabled component.
    ///
    /// # Errors
    ///
    /// Returns `UnknownComponentType` or `MissingService`.
    pub fn add_component(&mut self, entity: EntityId, type_name: &str) -> Result<ComponentRef> {
        let mut next = self.scene()?.clone();
        let (world, component) = next.world.add_component(entity, type_name)?;
        next.world = world;
        self.touch(&mut next, entity);
        self.commit("Add Component", next)?;
        debug!(%entity, type_name, "component_added");
        Ok(component)
    }

    /// Returns true if the entity has a component of this type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn has_component(&self, entity: EntityId, type_name: &str) -> Result<bool> {
        let world = &self.scene()?.world;
        world.validate(entity)?;
        Ok(world.components().has(entity, type_name))
    }

    /// First component of this type on the entity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn find_component(&self, entity: EntityId, type_name: &str) -> Result<Option<ComponentRef>> {
        let world = &self.scene()?.world;
        world.validate(entity)?;
        Ok(world.components().find(entity, type_name))
    }

    /// All components on the entity in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn components(&self, entity: EntityId) -> Result<Vec<ComponentRef>> {
        let world = &self.scene()?.world;
        world.validate(entity)?;
        Ok(world.components().list(entity))
    }

    /// Removes a component.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` or `NotPermitted` for permanent components.
    pub fn remove_component(&mut self, component: ComponentRef) -> Result<()> {
        let mut next = self.scene()?.clone();
        next.world = next.world.remove_component(component)?;
        self.touch(&mut next, component.entity);
        self.commit("Remove Component", next)
    }

    /// Returns true if the reference still resolves.
    #[must_use]
    pub fn is_component_valid(&self, component: ComponentRef) -> bool {
        self.scene()
            .is_ok_and(|s| s.world.components().get(component).is_some())
    }

    /// Returns true if the component is enabled (not pending or disabled).
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound`.
    pub fn is_component_enabled(&self, component: ComponentRef) -> Result<bool> {
        self.scene()?.world.components().is_enabled(component)
    }

    /// Enables a component, demoting components that conflict with it.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` or `MissingService`.
    pub fn enable_component(&mut self, component: ComponentRef) -> Result<()> {
        let mut next = self.scene()?.clone();
        next.world = next.world.activate_component(component)?;
        self.touch(&mut next, component.entity);
        self.commit("Enable Component", next)
    }

    /// Disables a component.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound`.
    pub fn disable_component(&mut self, component: ComponentRef) -> Result<()> {
        let mut next = self.scene()?.clone();
        next.world = next.world.deactivate_component(component)?;
        self.touch(&mut next, component.entity);
        self.commit("Disable Component", next)
    }

    /// Reads a property by labeled path.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFieldPath`, `ComponentNotFound`, or `FieldNotFound`.
    pub fn component_property(&self, component: ComponentRef, path: &str) -> Result<Value> {
        let path = FieldPath::parse(path)?;
        self.scene()?.world.get_field(component, &path)
    }

    /// Writes a property by labeled path.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFieldPath`, `ComponentNotFound`, `FieldNotFound`, or
    /// `TypeMismatch`.
    pub fn set_component_property(
        &mut self,
        component: ComponentRef,
        path: &str,
        value: Value,
    ) -> Result<()> {
        let path = FieldPath::parse(path)?;
        let mut next = self.scene()?.clone();
        next.world = next.world.set_field(component, &path, value)?;
        self.touch(&mut next, component.entity);
        self.commit("Edit Property", next)
    }

    /// Type name of a component.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound`.
    pub fn component_type_name(&self, component: ComponentRef) -> Result<String> {
        Ok(self
            .scene()?
            .world
            .components()
            .type_name(component)?
            .to_string())
    }

    /// Enters component mode on the component's entity, leaving any current
    /// component mode first.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound`.
    pub fn enter_component_mode(&mut self, component: ComponentRef) -> Result<()> {
        if self.scene()?.world.components().get(component).is_none() {
            return Err(Error::new(ErrorKind::ComponentNotFound(component)));
        }
        self.leave_component_mode();
        let entity = component.entity;
        self.component_mode = Some(entity);
        self.hub.emit(
            notify::COMPONENT_MODE,
            Address::Entity(entity),
            notify::ENTERED_COMPONENT_MODE,
            vec![Value::from(entity)],
        );
        info!(%entity, "component_mode_entered");
        Ok(())
    }

    /// Leaves component mode if active.
    pub fn leave_component_mode(&mut self) {
        if let Some(entity) = self.component_mode.take() {
            self.hub.emit(
                notify::COMPONENT_MODE,
                Address::Entity(entity),
                notify::LEFT_COMPONENT_MODE,
                vec![Value::from(entity)],
            );
            info!(%entity, "component_mode_left");
        }
    }

    /// Entity currently in component mode.
    #[must_use]
    pub fn component_mode_entity(&self) -> Option<EntityId> {
        self.component_mode
    }

    /// Simulates a physics contact between two entities. Only allowed while
    /// game mode runs.
    ///
    /// # Errors
    ///
    /// Returns `NotPermitted` outside game mode or for an unknown `kind`, and
    /// `InvalidTarget` for dead entities.
    pub fn inject_contact(&mut self, target: EntityId, other: EntityId, kind: &str) -> Result<()> {
        let world = &self.scene()?.world;
        world.validate(target)?;
        world.validate(other)?;
        if !self.is_in_game_mode() {
            return Err(Error::new(ErrorKind::NotPermitted {
                entity: target,
                reason: "contacts can only be injected in game mode".into(),
            }));
        }
        let bus = match kind {
            notify::COLLISION_BEGIN | notify::COLLISION_END => notify::COLLISION,
            notify::TRIGGER_ENTER => notify::TRIGGER,
            other_kind => {
                return Err(Error::new(ErrorKind::NotPermitted {
                    entity: target,
                    reason: format!("unknown contact kind {other_kind:?}"),
                }));
            }
        };
        self.hub.emit(
            bus,
            Address::Entity(target),
            kind,
            vec![Value::from(other)],
        );
        debug!(%target, %other, kind, "contact_injected");
        Ok(())
    }
}
