//! Ordered parent/child links between entities.
//!
//! Roots have no parent entry. Children keep the order they were attached in,
//! which is the order tree walks and name lookups visit them.

use im::{HashMap, Vector};
use stagehand_foundation::EntityId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parent/child relationships with ordered children.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hierarchy {
    parents: HashMap<EntityId, EntityId>,
    children: HashMap<EntityId, Vector<EntityId>>,
}

impl Hierarchy {
    /// Creates an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `child` under `parent` at `index` (clamped), detaching it first.
    pub fn attach(&mut self, child: EntityId, parent: EntityId, index: Option<usize>) {
        self.detach(child);
        let siblings = self.children.entry(parent).or_default();
        let at = index.map_or(siblings.len(), |i| i.min(siblings.len()));
        siblings.insert(at, child);
        self.parents.insert(child, parent);
    }

    /// Detaches `child` from its parent, making it a root. Returns the old parent.
    pub fn detach(&mut self, child: EntityId) -> Option<EntityId> {
        let parent = self.parents.remove(&child)?;
        if let Some(siblings) = self.children.get_mut(&parent) {
            if let Some(pos) = siblings.index_of(&child) {
                siblings.remove(pos);
            }
        }
        Some(parent)
    }

    /// Returns the parent of an entity.
    #[must_use]
    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.parents.get(&entity).copied()
    }

    /// Returns the children of an entity in order.
    #[must_use]
    pub fn children(&self, entity: EntityId) -> Vec<EntityId> {
        self.children
            .get(&entity)
            .map(|c| c.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the position of an entity among its siblings.
    #[must_use]
    pub fn index_of(&self, entity: EntityId) -> Option<usize> {
        let parent = self.parent(entity)?;
        self.children.get(&parent)?.index_of(&entity)
    }

    /// Returns true if `ancestor` is a strict ancestor of `entity`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: EntityId, entity: EntityId) -> bool {
        self.ancestors(entity).any(|a| a == ancestor)
    }

    /// Iterates the ancestors of an entity, nearest first.
    pub fn ancestors(&self, entity: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        std::iter::successors(self.parent(entity), move |e| self.parent(*e))
    }

    /// Returns `root` and all its descendants in pre-order.
    #[must_use]
    pub fn descendants(&self, root: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(entity) = stack.pop() {
            out.push(entity);
            if let Some(children) = self.children.get(&entity) {
                stack.extend(children.iter().rev().copied());
            }
        }
        out
    }

    /// Forgets an entity entirely. Its children become roots.
    pub fn remove(&mut self, entity: EntityId) {
        self.detach(entity);
        if let Some(children) = self.children.remove(&entity) {
            for child in &children {
                self.parents.remove(child);
            }
        }
    }
}
