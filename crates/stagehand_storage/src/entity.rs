//! Entity lifecycle management with generational indices.
//!
//! The `EntityStore` manages entity allocation and tracks generations
//! so a handle to a deleted entity never resolves to a newer one.

// Allow u64 to usize casts - we target 64-bit systems
#![allow(clippy::cast_possible_truncation)]

use im::Vector;
use stagehand_foundation::{EntityId, Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Manages entity lifecycle and generation tracking.
///
/// Backed by persistent vectors, so cloning a store for an undo snapshot
/// shares structure with the original.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityStore {
    /// Generation counter for each entity index.
    /// Even generations are free, odd generations are alive.
    generations: Vector<u32>,
    /// Free list of indices available for reuse.
    free_list: Vector<u64>,
    /// Count of live entities.
    live_count: usize,
}

impl EntityStore {
    /// Creates a new empty entity store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a new entity, returns its ID.
    ///
    /// Reuses indices from the free list when available.
    pub fn spawn(&mut self) -> EntityId {
        self.live_count += 1;

        if let Some(index) = self.free_list.pop_front() {
            let idx = index as usize;
            let generation = self.generations[idx] + 1;
            self.generations.set(idx, generation);
            EntityId::new(index, generation)
        } else {
            let index = self.generations.len() as u64;
            // New entities start at generation 1 (odd = alive)
            self.generations.push_back(1);
            EntityId::new(index, 1)
        }
    }

    /// Destroys an entity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the entity is stale or already destroyed.
    pub fn destroy(&mut self, id: EntityId) -> Result<()> {
        self.validate(id)?;

        let idx = id.index as usize;
        self.generations.set(idx, id.generation + 1);
        self.free_list.push_back(id.index);
        self.live_count -= 1;

        Ok(())
    }

    /// Checks if an entity exists and is not stale.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.generations
            .get(id.index as usize)
            .is_some_and(|&generation| generation == id.generation && generation % 2 == 1)
    }

    /// Validates that an entity is live.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` if the entity is stale or never existed.
    pub fn validate(&self, id: EntityId) -> Result<()> {
        if self.exists(id) {
            Ok(())
        } else {
            Err(Error::invalid_target(id))
        }
    }

    /// Returns the total number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Returns true if there are no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Iterates over all live entity IDs in index order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.generations
            .iter()
            .enumerate()
            .filter(|(_, generation)| *generation % 2 == 1)
            .map(|(idx, generation)| EntityId::new(idx as u64, *generation))
    }

    /// Returns the current generation for an index, if it exists.
    #[must_use]
    pub fn generation(&self, index: u64) -> Option<u32> {
        self.generations.get(index as usize).copied()
    }
}
