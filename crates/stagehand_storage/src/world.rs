//! World state management with immutable snapshots.
//!
//! The `World` is the unified interface to entity, component, and hierarchy
//! storage. It uses persistent data structures, so cloning a world for an undo
//! snapshot is cheap and shares structure with the original.

use std::sync::Arc;

use im::HashMap;
use stagehand_foundation::{
    ComponentRef, EntityId, Error, ErrorKind, FieldPath, Result, Value, Vec3,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::component::{ComponentInstance, ComponentStore};
use crate::entity::EntityStore;
use crate::hierarchy::Hierarchy;
use crate::schema::ComponentSchema;

/// Per-entity data that is not a component.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityRecord {
    /// Display name. Not unique.
    pub name: Arc<str>,
    /// Translation relative to the parent.
    pub local: Vec3,
}

/// Immutable snapshot of the editor's world.
///
/// Clone is O(1) due to structural sharing via `Arc` and `im`.
/// All mutation methods return a new `World` instance.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct World {
    /// Entity lifecycle management.
    entities: Arc<EntityStore>,
    /// Names and local translations.
    records: HashMap<EntityId, EntityRecord>,
    /// Component data storage.
    components: Arc<ComponentStore>,
    /// Parent/child links.
    hierarchy: Arc<Hierarchy>,
}

impl World {
    /// Creates a new empty world with no component types.
    #[must_use]
    pub fn new() -> Self {
        Self {
            components: Arc::new(ComponentStore::new()),
            ..Self::default()
        }
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the entity is live.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.entities.exists(id)
    }

    /// Validates that an entity is live.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` otherwise.
    pub fn validate(&self, id: EntityId) -> Result<()> {
        self.entities.validate(id)
    }

    /// Iterates all live entities in index order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter()
    }

    /// Returns the component store.
    #[must_use]
    pub fn components(&self) -> &ComponentStore {
        &self.components
    }

    // --- Schema Registration ---

    /// Registers a component schema.
    ///
    /// Returns a new World with the schema registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is already registered.
    pub fn register_component(&self, schema: ComponentSchema) -> Result<World> {
        let mut components = (*self.components).clone();
        components.register_schema(schema)?;
        Ok(World {
            components: Arc::new(components),
            ..self.clone()
        })
    }

    // --- Entity Operations ---

    /// Spawns a new entity under `parent` (a root when `None`) with the given
    /// local translation, at sibling position `index` (appended when `None`).
    ///
    /// Returns a new World and the spawned entity ID.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if `parent` is not live.
    pub fn spawn(
        &self,
        name: &str,
        parent: Option<EntityId>,
        local: Vec3,
        index: Option<usize>,
    ) -> Result<(World, EntityId)> {
        if let Some(parent) = parent {
            self.validate(parent)?;
        }

        let mut entities = (*self.entities).clone();
        let id = entities.spawn();

        let mut records = self.records.clone();
        records.insert(
            id,
            EntityRecord {
                name: Arc::from(name),
                local,
            },
        );

        let mut hierarchy = (*self.hierarchy).clone();
        if let Some(parent) = parent {
            hierarchy.attach(id, parent, index);
        }

        let world = World {
            entities: Arc::new(entities),
            records,
            hierarchy: Arc::new(hierarchy),
            ..self.clone()
        };
        Ok((world, id))
    }

    /// Destroys an entity and all of its descendants.
    ///
    /// Returns a new World and the removed ids in pre-order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the entity is not live.
    pub fn destroy(&self, id: EntityId) -> Result<(World, Vec<EntityId>)> {
        self.validate(id)?;
        let removed = self.hierarchy.descendants(id);

        let mut entities = (*self.entities).clone();
        let mut records = self.records.clone();
        let mut components = (*self.components).clone();
        let mut hierarchy = (*self.hierarchy).clone();

        for entity in removed.iter().rev() {
            entities.destroy(*entity)?;
            records.remove(entity);
            components.remove_entity(*entity);
            hierarchy.remove(*entity);
        }

        let world = World {
            entities: Arc::new(entities),
            records,
            components: Arc::new(components),
            hierarchy: Arc::new(hierarchy),
        };
        Ok((world, removed))
    }

    /// Moves an entity under a new parent (a root when `None`), keeping its
    /// world translation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead ids, or `ReparentCycle` if the new
    /// parent is the entity itself or one of its descendants.
    pub fn reparent(
        &self,
        id: EntityId,
        parent: Option<EntityId>,
        index: Option<usize>,
    ) -> Result<World> {
        self.validate(id)?;
        if let Some(parent) = parent {
            self.validate(parent)?;
            if parent == id || self.hierarchy.is_ancestor(id, parent) {
                return Err(Error::new(ErrorKind::ReparentCycle { entity: id, parent }));
            }
        }

        let world_pos = self.world_translation(id)?;
        let parent_pos = match parent {
            Some(p) => self.world_translation(p)?,
            None => Vec3::ZERO,
        };

        let mut hierarchy = (*self.hierarchy).clone();
        match parent {
            Some(p) => hierarchy.attach(id, p, index),
            None => {
                hierarchy.detach(id);
            }
        }

        let mut records = self.records.clone();
        if let Some(record) = records.get_mut(&id) {
            record.local = world_pos - parent_pos;
        }

        Ok(World {
            records,
            hierarchy: Arc::new(hierarchy),
            ..self.clone()
        })
    }

    fn record(&self, id: EntityId) -> Result<&EntityRecord> {
        self.records.get(&id).ok_or_else(|| Error::invalid_target(id))
    }

    fn with_record(&self, id: EntityId, f: impl FnOnce(&mut EntityRecord)) -> Result<World> {
        self.validate(id)?;
        let mut records = self.records.clone();
        let record = records.get_mut(&id).ok_or_else(|| Error::invalid_target(id))?;
        f(record);
        Ok(World {
            records,
            ..self.clone()
        })
    }

    /// Returns an entity's name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the entity is not live.
    pub fn name(&self, id: EntityId) -> Result<&str> {
        self.validate(id)?;
        Ok(&self.record(id)?.name)
    }

    /// Renames an entity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the entity is not live.
    pub fn set_name(&self, id: EntityId, name: &str) -> Result<World> {
        self.with_record(id, |r| r.name = Arc::from(name))
    }

    /// Returns an entity's parent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the entity is not live.
    pub fn parent(&self, id: EntityId) -> Result<Option<EntityId>> {
        self.validate(id)?;
        Ok(self.hierarchy.parent(id))
    }

    /// Returns an entity's children in order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the entity is not live.
    pub fn children(&self, id: EntityId) -> Result<Vec<EntityId>> {
        self.validate(id)?;
        Ok(self.hierarchy.children(id))
    }

    /// Returns an entity's position among its siblings.
    #[must_use]
    pub fn sibling_index(&self, id: EntityId) -> Option<usize> {
        self.hierarchy.index_of(id)
    }

    /// Returns the entity and its descendants in pre-order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the entity is not live.
    pub fn descendants(&self, id: EntityId) -> Result<Vec<EntityId>> {
        self.validate(id)?;
        Ok(self.hierarchy.descendants(id))
    }

    /// Returns true if `ancestor` is a strict ancestor of `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: EntityId, id: EntityId) -> bool {
        self.hierarchy.is_ancestor(ancestor, id)
    }

    /// Iterates an entity's ancestors, nearest first.
    pub fn ancestors(&self, id: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        self.hierarchy.ancestors(id)
    }

    /// Returns parentless entities in index order.
    pub fn roots(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities
            .iter()
            .filter(|e| self.hierarchy.parent(*e).is_none())
    }

    /// Finds the first entity with `name`, visiting roots in index order and
    /// each tree in pre-order.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.roots()
            .flat_map(|root| self.hierarchy.descendants(root))
            .find(|e| self.records.get(e).is_some_and(|r| &*r.name == name))
    }

    // --- Transforms ---

    /// Returns the translation relative to the parent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the entity is not live.
    pub fn local_translation(&self, id: EntityId) -> Result<Vec3> {
        self.validate(id)?;
        Ok(self.record(id)?.local)
    }

    /// Returns the world translation: the sum of local translations up the tree.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the entity is not live.
    pub fn world_translation(&self, id: EntityId) -> Result<Vec3> {
        let mut total = self.local_translation(id)?;
        for ancestor in self.hierarchy.ancestors(id) {
            total += self.record(ancestor)?.local;
        }
        Ok(total)
    }

    /// Sets the translation relative to the parent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the entity is not live.
    pub fn set_local_translation(&self, id: EntityId, local: Vec3) -> Result<World> {
        self.with_record(id, |r| r.local = local)
    }

    /// Sets the world translation. Descendants move with the entity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the entity is not live.
    pub fn set_world_translation(&self, id: EntityId, position: Vec3) -> Result<World> {
        let parent_pos = match self.parent(id)? {
            Some(p) => self.world_translation(p)?,
            None => Vec3::ZERO,
        };
        self.set_local_translation(id, position - parent_pos)
    }

    // --- Component Operations ---

    fn with_components<T>(
        &self,
        f: impl FnOnce(&mut ComponentStore) -> Result<T>,
    ) -> Result<(World, T)> {
        let mut components = (*self.components).clone();
        let out = f(&mut components)?;
        let world = World {
            components: Arc::new(components),
            ..self.clone()
        };
        Ok((world, out))
    }

    /// Adds a component by type name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget`, `UnknownComponentType`, or `MissingService`.
    pub fn add_component(&self, id: EntityId, type_name: &str) -> Result<(World, ComponentRef)> {
        self.validate(id)?;
        self.with_components(|c| c.add(id, type_name))
    }

    /// Adds a copy of an existing component instance under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` or `UnknownComponentType`.
    pub fn insert_component_copy(
        &self,
        id: EntityId,
        source: &ComponentInstance,
    ) -> Result<(World, ComponentRef)> {
        self.validate(id)?;
        self.with_components(|c| c.insert_copy(id, source))
    }

    /// Removes a component.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` or `NotPermitted`.
    pub fn remove_component(&self, component: ComponentRef) -> Result<World> {
        self.with_components(|c| c.remove(component)).map(|(w, ())| w)
    }

    /// Enables a component, displacing conflicting ones.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` or `MissingService`.
    pub fn activate_component(&self, component: ComponentRef) -> Result<World> {
        self.with_components(|c| c.activate(component)).map(|(w, ())| w)
    }

    /// Disables a component.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound`.
    pub fn deactivate_component(&self, component: ComponentRef) -> Result<World> {
        self.with_components(|c| c.deactivate(component))
            .map(|(w, ())| w)
    }

    /// Writes a component field.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound`, `FieldNotFound`, or `TypeMismatch`.
    pub fn set_field(&self, component: ComponentRef, path: &FieldPath, value: Value) -> Result<World> {
        self.with_components(|c| c.set_field(component, path, value))
            .map(|(w, ())| w)
    }

    /// Reads a component field.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` or `FieldNotFound`.
    pub fn get_field(&self, component: ComponentRef, path: &FieldPath) -> Result<Value> {
        self.components.get_field(component, path)
    }
}
