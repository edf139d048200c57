//! Post-conditions over prefab instances once propagation settled.
//!
//! Each validator emits exactly one record per assertion and returns whether
//! all of them held.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use stagehand_foundation::names::{notify, prefab};
use stagehand_foundation::{Address, EntityId, Vec3};
use tracing::debug;

use crate::entity::EntityHandle;
use crate::error::HarnessResult;
use crate::prefab::PrefabInstance;
use crate::report::LabelPair;
use crate::session::Session;

/// Expected shape of an entity subtree, matched by name and child order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpectedTree {
    /// Entity name.
    pub name: String,
    /// Expected children, in order.
    pub children: Vec<ExpectedTree>,
}

impl ExpectedTree {
    /// An entity without children.
    #[must_use]
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::node(name, Vec::new())
    }

    /// An entity with the given children.
    #[must_use]
    pub fn node(name: impl Into<String>, children: Vec<ExpectedTree>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// A chain of names, each the only child of the one before. An empty
    /// chain yields an unnamed leaf.
    #[must_use]
    pub fn chain(names: &[&str]) -> Self {
        let mut iter = names.iter().rev();
        let mut tree = Self::leaf(iter.next().copied().unwrap_or_default());
        for name in iter {
            tree = Self::node(*name, vec![tree]);
        }
        tree
    }
}

impl fmt::Display for ExpectedTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.children.is_empty() {
            write!(f, "[")?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{child}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

const UNDO_CREATE: LabelPair = LabelPair::fixed(
    "Undo removed the prefab instance",
    "Undo did not remove the prefab instance",
);
const REDO_CREATE: LabelPair = LabelPair::fixed(
    "Redo restored the prefab instance",
    "Redo did not restore the prefab instance",
);
const UNDO_DUPLICATE: LabelPair = LabelPair::fixed(
    "Undo removed the duplicated instance",
    "Undo did not remove the duplicated instance",
);
const REDO_DUPLICATE: LabelPair = LabelPair::fixed(
    "Redo restored the duplicated instance",
    "Redo did not restore the duplicated instance",
);
const NESTED_POSITIONS: LabelPair = LabelPair::fixed(
    "Nested entities inherit their parent's position",
    "Nested entities do not inherit their parent's position",
);
const NESTED_TAIL: LabelPair = LabelPair::fixed(
    "Nested chain ends in a leaf",
    "Nested chain does not end in a leaf",
);
const HIERARCHY: LabelPair = LabelPair::fixed(
    "Prefab hierarchy matches",
    "Prefab hierarchy does not match",
);

impl Session {
    /// Ticks until the editor ends its propagation cycle. Returns false on
    /// timeout. Call after every edit before reading structure.
    ///
    /// # Errors
    ///
    /// Returns an error only when the editor is unreachable.
    pub fn wait_for_propagation(&mut self) -> HarnessResult<bool> {
        let timeout = self.config.propagation_timeout;
        self.with_subscription(notify::PREFAB, Address::Broadcast, |session, subscription| {
            let ended = Rc::new(Cell::new(false));
            let flag = Rc::clone(&ended);
            subscription.on(notify::PROPAGATION_END, move |_| flag.set(true));
            session.wait_for(timeout, |s| {
                if ended.get() {
                    return Ok(true);
                }
                let busy: bool = s.broadcast(prefab::BUS, prefab::IS_PROPAGATION_IN_PROGRESS, &[])?;
                Ok(!busy)
            })
        })
    }

    fn children_or_empty(&mut self, id: EntityId) -> HarnessResult<Vec<EntityId>> {
        if self.is_valid(id)? {
            self.entity_children(id)
        } else {
            Ok(Vec::new())
        }
    }

    fn child_set(&mut self, id: EntityId) -> HarnessResult<BTreeSet<EntityId>> {
        Ok(self.children_or_empty(id)?.into_iter().collect())
    }

    /// Checks that following first children from `root` reaches exactly
    /// `depth` entities, all at world position `origin`, ending in a leaf.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is stale.
    pub fn validate_linear_nested(
        &mut self,
        root: &EntityHandle,
        depth: usize,
        origin: Vec3,
    ) -> HarnessResult<bool> {
        let mut chain = vec![root.id];
        let mut current = root.id;
        while let Some(&first) = self.entity_children(current)?.first() {
            chain.push(first);
            current = first;
        }
        debug!(%root, found = chain.len(), depth, "nested_chain");

        let depth_labels = LabelPair::new(
            format!("Nested chain has depth {depth}"),
            format!("Nested chain does not have depth {depth}"),
        );
        let depth_ok = self.record(&depth_labels, chain.len() == depth);

        let mut positions_ok = true;
        for &id in &chain {
            positions_ok &= self.world_position(id)?.is_close(origin, Vec3::TOLERANCE);
        }
        let positions_ok = self.record(&NESTED_POSITIONS, positions_ok);

        let tail_ok = match chain.get(depth.wrapping_sub(1)) {
            Some(&tail) => self.entity_children(tail)?.is_empty(),
            None => false,
        };
        let tail_ok = self.record(&NESTED_TAIL, tail_ok);

        Ok(depth_ok && positions_ok && tail_ok)
    }

    /// Undoes the edit that created `instance` and checks its container left
    /// `parent`; redoes and checks the children of `parent` and of the
    /// container are restored.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is stale or the editor is unreachable.
    pub fn validate_undo_redo_on_create(
        &mut self,
        instance: &PrefabInstance,
        parent: EntityId,
    ) -> HarnessResult<bool> {
        let before = self.child_set(parent)?;

        self.undo()?;
        let after_undo = self.child_set(parent)?;
        let undone = self.record(&UNDO_CREATE, !after_undo.contains(&instance.id()));

        self.redo()?;
        let after_redo = self.child_set(parent)?;
        let restored = after_redo == before
            && self.entity_parent(instance.id()).ok().flatten() == Some(parent)
            && self.children_or_empty(instance.id())? == instance.child_ids();
        let redone = self.record(&REDO_CREATE, restored);

        Ok(undone && redone)
    }

    /// Undoes the duplication of `original` into `duplicate` and checks only
    /// the original remains under `parent`; redoes and checks both are back.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is stale or the editor is unreachable.
    pub fn validate_undo_redo_on_duplicate(
        &mut self,
        original: &PrefabInstance,
        duplicate: &PrefabInstance,
        parent: EntityId,
    ) -> HarnessResult<bool> {
        let before = self.child_set(parent)?;

        self.undo()?;
        let after_undo = self.child_set(parent)?;
        let undone = self.record(
            &UNDO_DUPLICATE,
            !after_undo.contains(&duplicate.id()) && after_undo.contains(&original.id()),
        );

        self.redo()?;
        let after_redo = self.child_set(parent)?;
        let redone = self.record(
            &REDO_DUPLICATE,
            after_redo == before
                && after_redo.contains(&duplicate.id())
                && duplicate.id() != original.id(),
        );

        Ok(undone && redone)
    }

    /// Compares the instance's content, by name and order, with `expected`,
    /// one tree per direct child of the container.
    ///
    /// # Errors
    ///
    /// Returns an error if the container is stale.
    pub fn validate_hierarchy(
        &mut self,
        instance: &PrefabInstance,
        expected: &[ExpectedTree],
    ) -> HarnessResult<bool> {
        let mismatch = self.compare_children(instance.id(), expected, &instance.container.name)?;
        if let Some(problem) = &mismatch {
            self.info(problem);
        }
        Ok(self.record(&HIERARCHY, mismatch.is_none()))
    }

    fn compare_children(
        &mut self,
        id: EntityId,
        expected: &[ExpectedTree],
        at: &str,
    ) -> HarnessResult<Option<String>> {
        let children = self.entity_children(id)?;
        if children.len() != expected.len() {
            return Ok(Some(format!(
                "{at} has {} children, expected {}",
                children.len(),
                expected.len()
            )));
        }
        for (child, want) in children.into_iter().zip(expected) {
            let name = self.entity_name(child)?;
            let path = format!("{at}/{name}");
            if name != want.name {
                return Ok(Some(format!("{path} found where {} was expected", want.name)));
            }
            if let Some(problem) = self.compare_children(child, &want.children, &path)? {
                return Ok(Some(problem));
            }
        }
        Ok(None)
    }
}
