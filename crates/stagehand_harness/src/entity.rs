//! Entity and component facade.
//!
//! Handles cache what the editor reported when they were made and are
//! validated lazily: a stale handle fails at the next call that uses it.

use std::fmt;
use std::hash::{Hash, Hasher};

use stagehand_foundation::names::{component, entity, physics};
use stagehand_foundation::{ComponentRef, EntityId, ErrorKind, FromValue, Value, Vec3};
use tracing::{debug, warn};

use crate::error::{HarnessError, HarnessResult};
use crate::session::Session;

// =============================================================================
// Handles
// =============================================================================

/// Caller-side view of an entity. Equality and hashing use the id only.
#[derive(Clone, Debug)]
pub struct EntityHandle {
    /// Engine id.
    pub id: EntityId,
    /// Name when the handle was made.
    pub name: String,
    /// Parent when the handle was made; `None` only for the level root.
    pub parent: Option<EntityId>,
}

impl PartialEq for EntityHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityHandle {}

impl Hash for EntityHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Caller-side view of one component instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentHandle {
    /// Engine reference.
    pub component: ComponentRef,
    /// Registered type name.
    pub type_name: String,
}

impl ComponentHandle {
    /// The owning entity.
    #[must_use]
    pub fn entity(&self) -> EntityId {
        self.component.entity
    }
}

impl fmt::Display for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.type_name, self.component.entity)
    }
}

/// The kinds of simulated physics contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    /// Two bodies started touching.
    CollisionBegin,
    /// Two bodies stopped touching.
    CollisionEnd,
    /// A body entered a trigger volume.
    TriggerEnter,
}

impl Contact {
    /// The notification event this contact raises.
    #[must_use]
    pub fn event(self) -> &'static str {
        use stagehand_foundation::names::notify;
        match self {
            Contact::CollisionBegin => notify::COLLISION_BEGIN,
            Contact::CollisionEnd => notify::COLLISION_END,
            Contact::TriggerEnter => notify::TRIGGER_ENTER,
        }
    }
}

// =============================================================================
// Entities
// =============================================================================

impl Session {
    /// Creates an entity. Without a parent it lands under the level root;
    /// without a position it sits at the world origin; without a name the
    /// editor picks `EntityN`.
    ///
    /// # Errors
    ///
    /// Returns `NotFocused` if the parent belongs to a prefab that is not
    /// focused, or `InvalidTarget` for a stale parent.
    pub fn create_entity(
        &mut self,
        name: Option<&str>,
        parent: Option<&EntityHandle>,
        position: Option<Vec3>,
    ) -> HarnessResult<EntityHandle> {
        let args = [
            Value::from(name),
            Value::from(parent.map(|p| p.id)),
            Value::from(position),
        ];
        let id: EntityId = self.broadcast(entity::BUS, entity::CREATE, &args)?;
        let handle = self.entity_handle(id)?;
        debug!(%handle, "entity_created");
        Ok(handle)
    }

    /// Makes a fresh handle for `id`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the entity is gone.
    pub fn entity_handle(&mut self, id: EntityId) -> HarnessResult<EntityHandle> {
        let name = self.entity_name(id)?;
        let parent = self.entity_parent(id)?;
        Ok(EntityHandle { id, name, parent })
    }

    /// The open level's root entity.
    ///
    /// # Errors
    ///
    /// Returns `NoLevelLoaded` if no level is open.
    pub fn level_root(&mut self) -> HarnessResult<EntityHandle> {
        let id: EntityId = self.broadcast(entity::BUS, entity::GET_LEVEL_ROOT, &[])?;
        self.entity_handle(id)
    }

    /// First entity with this name in tree order.
    ///
    /// # Errors
    ///
    /// Returns `NoLevelLoaded` if no level is open.
    pub fn find_entity(&mut self, name: &str) -> HarnessResult<Option<EntityHandle>> {
        let found: Option<EntityId> =
            self.broadcast(entity::BUS, entity::FIND_BY_NAME, &[Value::from(name)])?;
        found.map(|id| self.entity_handle(id)).transpose()
    }

    /// True while the entity exists.
    ///
    /// # Errors
    ///
    /// Returns an error only when the editor is unreachable.
    pub fn is_valid(&mut self, id: EntityId) -> HarnessResult<bool> {
        Ok(self.broadcast(entity::BUS, entity::IS_VALID, &[Value::from(id)])?)
    }

    /// Deletes an entity and its descendants. Returns the removed ids.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for stale handles and `NotFocused` inside an
    /// unfocused prefab.
    pub fn delete_entity(&mut self, handle: &EntityHandle) -> HarnessResult<Vec<EntityId>> {
        let removed: Vec<EntityId> = self.event(entity::BUS, entity::DELETE, handle.id, &[])?;
        debug!(%handle, removed = removed.len(), "entity_deleted");
        Ok(removed)
    }

    /// Moves an entity under `parent`, or under the level root for `None`.
    /// World position is kept. One undo step.
    ///
    /// # Errors
    ///
    /// Returns `ReparentCycle` when `parent` is the entity or below it.
    pub fn reparent_entity(
        &mut self,
        handle: &EntityHandle,
        parent: Option<&EntityHandle>,
    ) -> HarnessResult<()> {
        let args = [Value::from(parent.map(|p| p.id))];
        self.event::<()>(entity::BUS, entity::SET_PARENT, handle.id, &args)?;
        Ok(())
    }

    /// Current name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn entity_name(&mut self, id: EntityId) -> HarnessResult<String> {
        Ok(self.event(entity::BUS, entity::GET_NAME, id, &[])?)
    }

    /// Renames the entity and refreshes the handle's cached name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn set_entity_name(&mut self, handle: &mut EntityHandle, name: &str) -> HarnessResult<()> {
        self.event::<()>(entity::BUS, entity::SET_NAME, handle.id, &[Value::from(name)])?;
        handle.name = name.to_string();
        Ok(())
    }

    /// Current parent; `None` for the level root.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn entity_parent(&mut self, id: EntityId) -> HarnessResult<Option<EntityId>> {
        Ok(self.event(entity::BUS, entity::GET_PARENT, id, &[])?)
    }

    /// Children in order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn entity_children(&mut self, id: EntityId) -> HarnessResult<Vec<EntityId>> {
        Ok(self.event(entity::BUS, entity::GET_CHILDREN, id, &[])?)
    }

    /// World-space translation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn world_position(&mut self, id: EntityId) -> HarnessResult<Vec3> {
        Ok(self.event(entity::BUS, entity::GET_WORLD_TRANSLATION, id, &[])?)
    }

    /// Moves the entity in world space; descendants follow.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn set_world_position(&mut self, id: EntityId, position: Vec3) -> HarnessResult<()> {
        let args = [Value::from(position)];
        self.event::<()>(entity::BUS, entity::SET_WORLD_TRANSLATION, id, &args)?;
        Ok(())
    }

    /// Translation relative to the parent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities.
    pub fn local_position(&mut self, id: EntityId) -> HarnessResult<Vec3> {
        Ok(self.event(entity::BUS, entity::GET_LOCAL_TRANSLATION, id, &[])?)
    }

    /// Raises a simulated contact on `target` with `other`. Game mode only.
    ///
    /// # Errors
    ///
    /// Returns `NotPermitted` outside game mode.
    pub fn simulate_contact(
        &mut self,
        target: &EntityHandle,
        other: &EntityHandle,
        contact: Contact,
    ) -> HarnessResult<()> {
        let args = [Value::from(other.id), Value::from(contact.event())];
        self.event::<()>(physics::BUS, physics::INJECT_CONTACT, target.id, &args)?;
        Ok(())
    }
}

// =============================================================================
// Components
// =============================================================================

impl Session {
    fn component_handle(&mut self, component: ComponentRef) -> HarnessResult<ComponentHandle> {
        let type_name: String = self.broadcast(
            component::BUS,
            component::TYPE_NAME,
            &[Value::from(component)],
        )?;
        Ok(ComponentHandle {
            component,
            type_name,
        })
    }

    /// Adds a component by type name. A component that conflicts with an
    /// enabled one is added disabled.
    ///
    /// # Errors
    ///
    /// Returns `UnknownComponentType` or `MissingService`.
    pub fn add_component(
        &mut self,
        handle: &EntityHandle,
        type_name: &str,
    ) -> HarnessResult<ComponentHandle> {
        let args = [Value::from(handle.id), Value::from(type_name)];
        let component: ComponentRef = self.broadcast(component::BUS, component::ADD, &args)?;
        debug!(%handle, type_name, "component_added");
        Ok(ComponentHandle {
            component,
            type_name: type_name.to_string(),
        })
    }

    /// True if the entity has a component of this type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for stale handles.
    pub fn has_component(&mut self, handle: &EntityHandle, type_name: &str) -> HarnessResult<bool> {
        let args = [Value::from(handle.id), Value::from(type_name)];
        Ok(self.broadcast(component::BUS, component::HAS, &args)?)
    }

    /// First component of this type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for stale handles.
    pub fn find_component(
        &mut self,
        handle: &EntityHandle,
        type_name: &str,
    ) -> HarnessResult<Option<ComponentHandle>> {
        let args = [Value::from(handle.id), Value::from(type_name)];
        let found: Option<ComponentRef> = self.broadcast(component::BUS, component::FIND, &args)?;
        Ok(found.map(|component| ComponentHandle {
            component,
            type_name: type_name.to_string(),
        }))
    }

    /// Every component on the entity in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for stale handles.
    pub fn components(&mut self, handle: &EntityHandle) -> HarnessResult<Vec<ComponentHandle>> {
        let refs: Vec<ComponentRef> =
            self.broadcast(component::BUS, component::LIST, &[Value::from(handle.id)])?;
        refs.into_iter()
            .map(|c| self.component_handle(c))
            .collect()
    }

    /// Removes a component. A disabled component it conflicted with is
    /// re-enabled.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` for stale handles.
    pub fn remove_component(&mut self, handle: &ComponentHandle) -> HarnessResult<()> {
        self.broadcast::<()>(
            component::BUS,
            component::REMOVE,
            &[Value::from(handle.component)],
        )?;
        debug!(%handle, "component_removed");
        Ok(())
    }

    /// Reads a property by labeled path, `|` or `.` separated.
    ///
    /// # Errors
    ///
    /// Returns `FieldNotFound`, `InvalidFieldPath`, or `TypeMismatch` if the
    /// value is not a `T`.
    pub fn get_field<T: FromValue>(
        &mut self,
        handle: &ComponentHandle,
        path: &str,
    ) -> HarnessResult<T> {
        let args = [Value::from(handle.component), Value::from(path)];
        Ok(self.broadcast(component::BUS, component::GET_PROPERTY, &args)?)
    }

    /// Writes a property. Returns false when the path does not exist or the
    /// value has the wrong shape.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` for stale handles.
    pub fn set_field(
        &mut self,
        handle: &ComponentHandle,
        path: &str,
        value: impl Into<Value>,
    ) -> HarnessResult<bool> {
        let args = [Value::from(handle.component), Value::from(path), value.into()];
        match self.broadcast::<()>(component::BUS, component::SET_PROPERTY, &args) {
            Ok(()) => Ok(true),
            Err(err)
                if matches!(
                    err.kind,
                    ErrorKind::FieldNotFound { .. }
                        | ErrorKind::TypeMismatch { .. }
                        | ErrorKind::InvalidFieldPath(_)
                ) =>
            {
                warn!(%handle, path, error = %err, "set_field_refused");
                Ok(false)
            }
            Err(err) => Err(HarnessError::from(err)),
        }
    }

    /// True if the component is enabled.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` for stale handles.
    pub fn is_enabled(&mut self, handle: &ComponentHandle) -> HarnessResult<bool> {
        Ok(self.broadcast(
            component::BUS,
            component::IS_ENABLED,
            &[Value::from(handle.component)],
        )?)
    }

    /// Enables the component, disabling whatever it conflicts with.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` or `MissingService`.
    pub fn activate(&mut self, handle: &ComponentHandle) -> HarnessResult<()> {
        self.broadcast::<()>(
            component::BUS,
            component::ENABLE,
            &[Value::from(handle.component)],
        )?;
        Ok(())
    }

    /// Disables the component.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` for stale handles.
    pub fn deactivate(&mut self, handle: &ComponentHandle) -> HarnessResult<()> {
        self.broadcast::<()>(
            component::BUS,
            component::DISABLE,
            &[Value::from(handle.component)],
        )?;
        Ok(())
    }

    /// Enters component mode for the component's entity.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` for stale handles.
    pub fn enter_component_mode(&mut self, handle: &ComponentHandle) -> HarnessResult<()> {
        self.broadcast::<()>(
            component::BUS,
            component::ENTER_COMPONENT_MODE,
            &[Value::from(handle.component)],
        )?;
        Ok(())
    }

    /// Leaves component mode if active.
    ///
    /// # Errors
    ///
    /// Returns an error only when the editor is unreachable.
    pub fn leave_component_mode(&mut self) -> HarnessResult<()> {
        self.broadcast::<()>(component::BUS, component::LEAVE_COMPONENT_MODE, &[])?;
        Ok(())
    }
}
