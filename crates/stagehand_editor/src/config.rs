//! Configuration for the in-process editor.

use std::path::PathBuf;

/// Configuration for the in-process editor.
///
/// Tick counts control how many idle ticks asynchronous work takes, which is
/// what the harness's waiters have to bridge.
#[derive(Clone, Debug)]
pub struct EditorConfig {
    /// Maximum number of undo steps retained.
    pub undo_limit: usize,

    /// Ticks from a prefab edit to `propagation_end`.
    pub propagation_ticks: u32,

    /// Ticks before a newly written template is valid in the asset catalog.
    pub asset_processing_ticks: u32,

    /// Ticks a level load takes before the level reports active.
    pub level_load_ticks: u32,

    /// Directory levels and templates are written under. In-memory when `None`.
    pub content_root: Option<PathBuf>,

    /// Longest accepted level path, `Levels/<name>/<name>.level`.
    pub max_level_path: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_limit: 100,
            propagation_ticks: 2,
            asset_processing_ticks: 1,
            level_load_ticks: 3,
            content_root: None,
            max_level_path: 128,
        }
    }
}

impl EditorConfig {
    /// Creates a configuration where every asynchronous job finishes on the
    /// next tick.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            propagation_ticks: 1,
            asset_processing_ticks: 1,
            level_load_ticks: 1,
            ..Self::default()
        }
    }

    /// Creates a configuration with slow background work, for exercising waits.
    #[must_use]
    pub fn sluggish() -> Self {
        Self {
            propagation_ticks: 8,
            asset_processing_ticks: 6,
            level_load_ticks: 12,
            ..Self::default()
        }
    }

    /// Builder method to set the undo limit.
    #[must_use]
    pub fn with_undo_limit(mut self, limit: usize) -> Self {
        self.undo_limit = limit;
        self
    }

    /// Builder method to set propagation latency in ticks.
    #[must_use]
    pub fn with_propagation_ticks(mut self, ticks: u32) -> Self {
        self.propagation_ticks = ticks;
        self
    }

    /// Builder method to set asset processing latency in ticks.
    #[must_use]
    pub fn with_asset_processing_ticks(mut self, ticks: u32) -> Self {
        self.asset_processing_ticks = ticks;
        self
    }

    /// Builder method to set level load latency in ticks.
    #[must_use]
    pub fn with_level_load_ticks(mut self, ticks: u32) -> Self {
        self.level_load_ticks = ticks;
        self
    }

    /// Builder method to persist content under a directory.
    #[must_use]
    pub fn with_content_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.content_root = Some(root.into());
        self
    }

    /// Builder method to set the longest accepted level path.
    #[must_use]
    pub fn with_max_level_path(mut self, len: usize) -> Self {
        self.max_level_path = len;
        self
    }
}
