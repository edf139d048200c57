//! Component storage with service-based activation.
//!
//! Components are stored per entity in insertion order. Each component is
//! enabled, pending (switched off because a conflicting component is active),
//! or disabled by request. Pending components come back on their own once the
//! conflict goes away; disabled ones stay off until activated.

use std::sync::Arc;

use im::{HashMap, OrdMap, Vector};
use stagehand_foundation::{
    ComponentId, ComponentRef, ComponentTypeId, EntityId, Error, ErrorKind, FieldPath, Result,
    Value,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::schema::ComponentSchema;

/// Activation state of a component instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActivationState {
    /// Active.
    Enabled,
    /// Inactive because it conflicts with an enabled component or misses a service.
    Pending,
    /// Inactive by request.
    Disabled,
}

/// One component on one entity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentInstance {
    /// Instance id.
    pub id: ComponentId,
    /// Registered type.
    pub type_id: ComponentTypeId,
    /// Activation state.
    pub state: ActivationState,
    /// Field values by path.
    pub fields: OrdMap<FieldPath, Value>,
}

impl ComponentInstance {
    /// Returns true if the component is active.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state == ActivationState::Enabled
    }
}

/// Stores all component data for entities, plus the registered schemas.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentStore {
    /// Registered schemas by type id.
    schemas: HashMap<ComponentTypeId, Arc<ComponentSchema>>,
    /// Type id by display name.
    by_name: HashMap<String, ComponentTypeId>,
    /// Components per entity, in insertion order.
    instances: HashMap<EntityId, Vector<ComponentInstance>>,
    /// Next instance id to hand out.
    next_id: u64,
}

impl ComponentStore {
    /// Creates a new empty component store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Registers a component schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the type id or name is already registered.
    pub fn register_schema(&mut self, schema: ComponentSchema) -> Result<()> {
        if self.schemas.contains_key(&schema.type_id) || self.by_name.contains_key(&schema.name) {
            return Err(Error::internal(format!(
                "component schema already registered: {}",
                schema.name
            )));
        }
        self.by_name.insert(schema.name.clone(), schema.type_id);
        self.schemas.insert(schema.type_id, Arc::new(schema));
        Ok(())
    }

    /// Gets the schema for a component type.
    #[must_use]
    pub fn schema(&self, type_id: ComponentTypeId) -> Option<&ComponentSchema> {
        self.schemas.get(&type_id).map(Arc::as_ref)
    }

    /// Gets the schema registered under a display name.
    #[must_use]
    pub fn schema_by_name(&self, name: &str) -> Option<&ComponentSchema> {
        self.by_name.get(name).and_then(|id| self.schema(*id))
    }

    /// Iterates registered schemas in no particular order.
    pub fn schemas(&self) -> impl Iterator<Item = &ComponentSchema> + '_ {
        self.schemas.values().map(Arc::as_ref)
    }

    // --- Instance queries ---

    /// Iterates the components of an entity in insertion order.
    pub fn instances(&self, entity: EntityId) -> impl Iterator<Item = &ComponentInstance> + '_ {
        self.instances.get(&entity).into_iter().flatten()
    }

    /// Lists references to every component on an entity.
    #[must_use]
    pub fn list(&self, entity: EntityId) -> Vec<ComponentRef> {
        self.instances(entity)
            .map(|c| ComponentRef::new(entity, c.type_id, c.id))
            .collect()
    }

    /// Finds the first component of the named type on an entity.
    #[must_use]
    pub fn find(&self, entity: EntityId, type_name: &str) -> Option<ComponentRef> {
        let type_id = *self.by_name.get(type_name)?;
        self.instances(entity)
            .find(|c| c.type_id == type_id)
            .map(|c| ComponentRef::new(entity, c.type_id, c.id))
    }

    /// Checks whether an entity has a component of the named type.
    #[must_use]
    pub fn has(&self, entity: EntityId, type_name: &str) -> bool {
        self.find(entity, type_name).is_some()
    }

    /// Resolves a component reference.
    #[must_use]
    pub fn get(&self, component: ComponentRef) -> Option<&ComponentInstance> {
        self.instances(component.entity)
            .find(|c| c.id == component.id && c.type_id == component.type_id)
    }

    /// Returns the display name of a component's type.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` if the reference no longer resolves.
    pub fn type_name(&self, component: ComponentRef) -> Result<&str> {
        self.get(component)
            .and_then(|c| self.schema(c.type_id))
            .map(|s| s.name.as_str())
            .ok_or_else(|| Error::new(ErrorKind::ComponentNotFound(component)))
    }

    /// Returns whether a component is enabled.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` if the reference no longer resolves.
    pub fn is_enabled(&self, component: ComponentRef) -> Result<bool> {
        self.get(component)
            .map(ComponentInstance::is_enabled)
            .ok_or_else(|| Error::new(ErrorKind::ComponentNotFound(component)))
    }

    /// Reads a field.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` or `FieldNotFound`.
    pub fn get_field(&self, component: ComponentRef, path: &FieldPath) -> Result<Value> {
        let instance = self
            .get(component)
            .ok_or_else(|| Error::new(ErrorKind::ComponentNotFound(component)))?;
        instance
            .fields
            .get(path)
            .cloned()
            .ok_or_else(|| self.field_not_found(instance.type_id, path))
    }

    // --- Instance mutation ---

    /// Adds a component of the named type with default field values.
    ///
    /// The new component starts pending when it conflicts with an enabled one.
    ///
    /// # Errors
    ///
    /// Returns `UnknownComponentType`, or `MissingService` when a required
    /// service has no enabled provider on the entity.
    pub fn add(&mut self, entity: EntityId, type_name: &str) -> Result<ComponentRef> {
        let schema = self
            .by_name
            .get(type_name)
            .and_then(|id| self.schemas.get(id))
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::UnknownComponentType(type_name.to_string())))?;

        let enabled = self.enabled_schemas(entity, None);
        for service in &schema.requires {
            if !enabled.iter().any(|s| s.provides_service(service)) {
                return Err(Error::new(ErrorKind::MissingService {
                    component: schema.name.clone(),
                    service: service.clone(),
                }));
            }
        }

        let state = if enabled.iter().any(|s| s.conflicts_with(&schema)) {
            ActivationState::Pending
        } else {
            ActivationState::Enabled
        };
        let fields = schema
            .fields
            .iter()
            .map(|f| (f.path.clone(), f.default.clone()))
            .collect();

        let id = self.allocate_id();
        self.instances
            .entry(entity)
            .or_default()
            .push_back(ComponentInstance {
                id,
                type_id: schema.type_id,
                state,
                fields,
            });
        Ok(ComponentRef::new(entity, schema.type_id, id))
    }

    /// Inserts a copy of `source` on `entity` under a fresh id, keeping its
    /// state and field values. Used when materializing prefab content.
    ///
    /// # Errors
    ///
    /// Returns `UnknownComponentType` if the source type is not registered.
    pub fn insert_copy(
        &mut self,
        entity: EntityId,
        source: &ComponentInstance,
    ) -> Result<ComponentRef> {
        if !self.schemas.contains_key(&source.type_id) {
            return Err(Error::new(ErrorKind::UnknownComponentType(
                source.type_id.to_string(),
            )));
        }
        let id = self.allocate_id();
        self.instances
            .entry(entity)
            .or_default()
            .push_back(ComponentInstance {
                id,
                ..source.clone()
            });
        Ok(ComponentRef::new(entity, source.type_id, id))
    }

    /// Removes a component, then re-enables pending components whose
    /// conflict was resolved by the removal.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound`, or `NotPermitted` for permanent components.
    pub fn remove(&mut self, component: ComponentRef) -> Result<()> {
        let index = self.index_of(component)?;
        let schema = self.schema_arc(component.type_id)?;
        if !schema.removable {
            return Err(Error::new(ErrorKind::NotPermitted {
                entity: component.entity,
                reason: format!("{} cannot be removed", schema.name),
            }));
        }
        if let Some(list) = self.instances.get_mut(&component.entity) {
            list.remove(index);
        }
        self.settle(component.entity);
        Ok(())
    }

    /// Enables a component, switching conflicting enabled components to pending.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound`, or `MissingService` if a required service
    /// would have no enabled provider.
    pub fn activate(&mut self, component: ComponentRef) -> Result<()> {
        let index = self.index_of(component)?;
        let schema = self.schema_arc(component.type_id)?;

        let survivors: Vec<Arc<ComponentSchema>> = self
            .enabled_schemas(component.entity, Some(component.id))
            .into_iter()
            .filter(|s| !s.conflicts_with(&schema))
            .collect();
        for service in &schema.requires {
            if !survivors.iter().any(|s| s.provides_service(service)) {
                return Err(Error::new(ErrorKind::MissingService {
                    component: schema.name.clone(),
                    service: service.clone(),
                }));
            }
        }

        let conflicting: Vec<usize> = self
            .instances(component.entity)
            .enumerate()
            .filter(|(i, c)| *i != index && c.is_enabled())
            .filter(|(_, c)| {
                self.schemas
                    .get(&c.type_id)
                    .is_some_and(|s| s.conflicts_with(&schema))
            })
            .map(|(i, _)| i)
            .collect();

        if let Some(list) = self.instances.get_mut(&component.entity) {
            for i in conflicting {
                list[i].state = ActivationState::Pending;
            }
            list[index].state = ActivationState::Enabled;
        }
        self.settle(component.entity);
        Ok(())
    }

    /// Disables a component until it is explicitly activated again.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound`.
    pub fn deactivate(&mut self, component: ComponentRef) -> Result<()> {
        let index = self.index_of(component)?;
        if let Some(list) = self.instances.get_mut(&component.entity) {
            list[index].state = ActivationState::Disabled;
        }
        self.settle(component.entity);
        Ok(())
    }

    /// Writes a field, converting ints to floats where the schema expects a float.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound`, `FieldNotFound`, or `TypeMismatch`.
    pub fn set_field(&mut self, component: ComponentRef, path: &FieldPath, value: Value) -> Result<()> {
        let index = self.index_of(component)?;
        let schema = self.schema_arc(component.type_id)?;
        let field = schema
            .field(path)
            .ok_or_else(|| self.field_not_found(component.type_id, path))?;
        let value = value.coerce(&field.field_type)?;
        if let Some(list) = self.instances.get_mut(&component.entity) {
            list[index].fields.insert(path.clone(), value);
        }
        Ok(())
    }

    /// Removes every component of an entity.
    pub fn remove_entity(&mut self, entity: EntityId) {
        self.instances.remove(&entity);
    }

    // --- Internals ---

    fn allocate_id(&mut self) -> ComponentId {
        let id = ComponentId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        id
    }

    fn index_of(&self, component: ComponentRef) -> Result<usize> {
        self.instances(component.entity)
            .position(|c| c.id == component.id && c.type_id == component.type_id)
            .ok_or_else(|| Error::new(ErrorKind::ComponentNotFound(component)))
    }

    fn schema_arc(&self, type_id: ComponentTypeId) -> Result<Arc<ComponentSchema>> {
        self.schemas
            .get(&type_id)
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::UnknownComponentType(type_id.to_string())))
    }

    fn field_not_found(&self, type_id: ComponentTypeId, path: &FieldPath) -> Error {
        let component = self
            .schema(type_id)
            .map_or_else(|| type_id.to_string(), |s| s.name.clone());
        Error::new(ErrorKind::FieldNotFound {
            component,
            path: path.to_string(),
        })
    }

    /// Schemas of the enabled components on an entity, optionally skipping one.
    fn enabled_schemas(
        &self,
        entity: EntityId,
        except: Option<ComponentId>,
    ) -> Vec<Arc<ComponentSchema>> {
        self.instances(entity)
            .filter(|c| c.is_enabled() && Some(c.id) != except)
            .filter_map(|c| self.schemas.get(&c.type_id).cloned())
            .collect()
    }

    /// Demotes enabled components whose required services vanished, then
    /// promotes pending components that can run again, until nothing changes.
    fn settle(&mut self, entity: EntityId) {
        let Some(list) = self.instances.get(&entity).cloned() else {
            return;
        };
        let schemas: Vec<Option<Arc<ComponentSchema>>> = list
            .iter()
            .map(|c| self.schemas.get(&c.type_id).cloned())
            .collect();
        let mut states: Vec<ActivationState> = list.iter().map(|c| c.state).collect();

        let satisfied = |states: &[ActivationState], i: usize| -> bool {
            let Some(schema) = &schemas[i] else {
                return false;
            };
            schema.requires.iter().all(|service| {
                states.iter().enumerate().any(|(j, state)| {
                    j != i
                        && *state == ActivationState::Enabled
                        && schemas[j]
                            .as_ref()
                            .is_some_and(|s| s.provides_service(service))
                })
            })
        };
        let conflicted = |states: &[ActivationState], i: usize| -> bool {
            let Some(schema) = &schemas[i] else {
                return true;
            };
            states.iter().enumerate().any(|(j, state)| {
                j != i
                    && *state == ActivationState::Enabled
                    && schemas[j].as_ref().is_some_and(|s| s.conflicts_with(schema))
            })
        };

        loop {
            let mut changed = false;
            for i in 0..states.len() {
                if states[i] == ActivationState::Enabled && !satisfied(&states, i) {
                    states[i] = ActivationState::Pending;
                    changed = true;
                }
            }
            for i in 0..states.len() {
                if states[i] == ActivationState::Pending
                    && satisfied(&states, i)
                    && !conflicted(&states, i)
                {
                    states[i] = ActivationState::Enabled;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        if let Some(list) = self.instances.get_mut(&entity) {
            for (instance, state) in list.iter_mut().zip(states) {
                instance.state = state;
            }
        }
    }
}
