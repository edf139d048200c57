//! The editable scene: world state plus prefab instance links.
//!
//! A `SceneState` is what undo/redo snapshots. Cloning it is cheap.

use im::HashMap;
use serde::{Deserialize, Serialize};
use stagehand_foundation::{EntityId, Error, ErrorKind, Result, Vec3};
use stagehand_storage::World;

/// Link from an instance container to the template it was made from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceLink {
    /// Template path.
    pub template: String,
    /// True once a contained entity was edited while the instance was focused.
    pub modified: bool,
}

/// World state plus the prefab bookkeeping layered over it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneState {
    /// Entities, components, hierarchy.
    pub world: World,
    /// Instance containers and their templates.
    pub instances: HashMap<EntityId, InstanceLink>,
    /// The level's root entity. Every other entity descends from it.
    pub level_root: EntityId,
    /// Counter behind `EntityN` default names.
    next_auto_name: u64,
}

impl SceneState {
    /// Creates a scene holding only a level root named after the level.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be spawned.
    pub fn new(world: World, level_name: &str) -> Result<Self> {
        let (world, level_root) = world.spawn(level_name, None, Vec3::ZERO, None)?;
        Ok(Self {
            world,
            instances: HashMap::new(),
            level_root,
            // The level root counts as the first entity.
            next_auto_name: 2,
        })
    }

    /// Returns the next default entity name.
    pub fn next_auto_name(&mut self) -> String {
        let name = format!("Entity{}", self.next_auto_name);
        self.next_auto_name += 1;
        name
    }

    /// Returns true if `entity` is a prefab instance container.
    #[must_use]
    pub fn is_container(&self, entity: EntityId) -> bool {
        self.instances.contains_key(&entity)
    }

    /// Returns the instance link of a container.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` for dead entities and `NotAnInstance` for
    /// entities that are not containers.
    pub fn link(&self, container: EntityId) -> Result<&InstanceLink> {
        self.world.validate(container)?;
        self.instances
            .get(&container)
            .ok_or_else(|| Error::new(ErrorKind::NotAnInstance(container)))
    }

    /// Mutable access to a container's link.
    ///
    /// # Errors
    ///
    /// As [`SceneState::link`].
    pub fn link_mut(&mut self, container: EntityId) -> Result<&mut InstanceLink> {
        self.world.validate(container)?;
        self.instances
            .get_mut(&container)
            .ok_or_else(|| Error::new(ErrorKind::NotAnInstance(container)))
    }

    /// Returns the prefab that owns `entity`: the entity itself when it is a
    /// container, else its nearest container ancestor, else the level root.
    #[must_use]
    pub fn owning_instance(&self, entity: EntityId) -> EntityId {
        if self.is_container(entity) {
            return entity;
        }
        self.world
            .ancestors(entity)
            .find(|a| self.is_container(*a))
            .unwrap_or(self.level_root)
    }

    /// Returns the prefab whose hierarchy changes when children of `parent`
    /// are added, removed, or reordered.
    #[must_use]
    pub fn hierarchy_owner(&self, parent: EntityId) -> EntityId {
        self.owning_instance(parent)
    }

    /// Returns the live containers instantiated from `template`.
    #[must_use]
    pub fn instances_of(&self, template: &str) -> Vec<EntityId> {
        let mut found: Vec<EntityId> = self
            .instances
            .iter()
            .filter(|(_, link)| link.template == template)
            .map(|(container, _)| *container)
            .collect();
        found.sort();
        found
    }

    /// Drops links whose container no longer exists.
    pub fn prune_links(&mut self) {
        let world = &self.world;
        self.instances.retain(|container, _| world.exists(*container));
    }
}
