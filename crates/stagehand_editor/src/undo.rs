//! Undo/redo history of scene snapshots.
//!
//! Each undoable operation records the scene as it was before the edit.
//! Because scenes share structure, a snapshot costs little more than the
//! edit itself.

use std::collections::VecDeque;

use crate::scene::SceneState;

// =============================================================================
// Undo Entry
// =============================================================================

/// A scene snapshot plus the name of the operation that replaced it.
#[derive(Clone, Debug)]
pub struct UndoEntry {
    label: String,
    scene: SceneState,
}

impl UndoEntry {
    /// Creates a new entry.
    #[must_use]
    pub fn new(label: impl Into<String>, scene: SceneState) -> Self {
        Self {
            label: label.into(),
            scene,
        }
    }

    /// Returns the operation name.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the snapshot.
    #[must_use]
    pub fn scene(&self) -> &SceneState {
        &self.scene
    }
}

// =============================================================================
// Undo Stack
// =============================================================================

/// Bounded undo history with a redo branch that any new edit discards.
#[derive(Clone, Debug)]
pub struct UndoStack {
    undo: VecDeque<UndoEntry>,
    redo: Vec<UndoEntry>,
    capacity: usize,
}

impl UndoStack {
    /// Creates an empty stack keeping at most `capacity` undo steps.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(capacity.min(1024)),
            redo: Vec::new(),
            capacity,
        }
    }

    /// Returns the capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of undoable steps.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of redoable steps.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Records the scene as it was before an edit, evicting the oldest step
    /// if at capacity.
    pub fn record(&mut self, label: impl Into<String>, before: SceneState) {
        if self.capacity == 0 {
            return;
        }
        if self.undo.len() >= self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(UndoEntry::new(label, before));
        self.redo.clear();
    }

    /// Steps back. Returns the scene to install and the label undone.
    pub fn undo(&mut self, current: SceneState) -> Option<(SceneState, String)> {
        let entry = self.undo.pop_back()?;
        self.redo.push(UndoEntry::new(entry.label.clone(), current));
        Some((entry.scene, entry.label))
    }

    /// Steps forward again. Returns the scene to install and the label redone.
    pub fn redo(&mut self, current: SceneState) -> Option<(SceneState, String)> {
        let entry = self.redo.pop()?;
        self.undo.push_back(UndoEntry::new(entry.label.clone(), current));
        Some((entry.scene, entry.label))
    }

    /// Label of the step [`UndoStack::undo`] would revert.
    #[must_use]
    pub fn peek_undo(&self) -> Option<&UndoEntry> {
        self.undo.back()
    }

    /// Forgets all history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
