//! Named levels: validation, in-memory saves, and optional files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stagehand_foundation::{Error, ErrorKind, Result};
use tracing::debug;

use crate::scene::SceneState;

/// Terrain settings a level is created with.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelSettings {
    /// Heightmap resolution; a power of two.
    pub heightmap_resolution: i64,
    /// Heightmap meters per pixel; positive.
    pub meters_per_pixel: f64,
    /// Terrain texture resolution; a power of two.
    pub texture_resolution: i64,
    /// Whether the level has terrain.
    pub use_terrain: bool,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            heightmap_resolution: 1024,
            meters_per_pixel: 1.0,
            texture_resolution: 4096,
            use_terrain: false,
        }
    }
}

impl LevelSettings {
    /// Returns the reason these settings are unusable, if any.
    #[must_use]
    pub fn problem(&self) -> Option<&'static str> {
        let power_of_two = |v: i64| v > 0 && (v & (v - 1)) == 0;
        if !power_of_two(self.heightmap_resolution) {
            Some("heightmap resolution must be a power of two")
        } else if !(self.meters_per_pixel.is_finite() && self.meters_per_pixel > 0.0) {
            Some("meters per pixel must be positive")
        } else if !power_of_two(self.texture_resolution) {
            Some("texture resolution must be a power of two")
        } else {
            None
        }
    }
}

/// A saved level.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedLevel {
    /// Creation settings.
    pub settings: LevelSettings,
    /// Scene as of the last save.
    pub scene: SceneState,
}

/// All known levels.
#[derive(Clone, Debug, Default)]
pub struct LevelStore {
    levels: HashMap<String, SavedLevel>,
    content_root: Option<PathBuf>,
    max_path: usize,
}

impl LevelStore {
    /// Creates a store. Levels are mirrored under `content_root` if given.
    #[must_use]
    pub fn new(content_root: Option<PathBuf>, max_path: usize) -> Self {
        Self {
            levels: HashMap::new(),
            content_root,
            max_path,
        }
    }

    /// Relative path a level is stored at.
    #[must_use]
    pub fn relative_path(name: &str) -> String {
        format!("Levels/{name}/{name}.level")
    }

    /// Returns the reason `name` cannot be used for a new level, if any.
    #[must_use]
    pub fn name_problem(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            return Some("level name is empty".into());
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Some(format!("level name contains {bad:?}"));
        }
        let path = Self::relative_path(name);
        let full_len = self
            .content_root
            .as_ref()
            .map_or(path.len(), |root| root.join(&path).as_os_str().len());
        if full_len > self.max_path {
            return Some(format!(
                "level path is {full_len} characters, limit is {}",
                self.max_path
            ));
        }
        if self.exists(name) {
            return Some("a level with this name already exists".into());
        }
        None
    }

    /// Returns true if a level is saved under `name`, in memory or on disk.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.levels.contains_key(name) || self.file_for(name).is_some_and(|f| f.exists())
    }

    /// Stores a level, writing it to disk when a content root is set.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be written.
    pub fn save(&mut self, name: &str, level: SavedLevel) -> Result<()> {
        if let Some(file) = self.file_for(name) {
            write_level(&file, &level)?;
        }
        self.levels.insert(name.to_string(), level);
        Ok(())
    }

    /// Loads a level.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file exists but cannot be decoded.
    pub fn load(&mut self, name: &str) -> Result<Option<SavedLevel>> {
        if let Some(level) = self.levels.get(name) {
            return Ok(Some(level.clone()));
        }
        let Some(file) = self.file_for(name).filter(|f| f.exists()) else {
            return Ok(None);
        };
        let level = read_level(&file)?;
        self.levels.insert(name.to_string(), level.clone());
        Ok(Some(level))
    }

    fn file_for(&self, name: &str) -> Option<PathBuf> {
        self.content_root
            .as_ref()
            .map(|root| root.join(Self::relative_path(name)))
    }
}

fn io_error(file: &Path, what: &str, err: impl std::fmt::Display) -> Error {
    Error::new(ErrorKind::Io(format!(
        "failed to {what} '{}': {err}",
        file.display()
    )))
}

fn write_level(file: &Path, level: &SavedLevel) -> Result<()> {
    let bytes = rmp_serde::to_vec_named(level).map_err(|e| io_error(file, "encode", e))?;
    if let Some(dir) = file.parent() {
        fs::create_dir_all(dir).map_err(|e| io_error(dir, "create", e))?;
    }
    fs::write(file, bytes).map_err(|e| io_error(file, "write", e))?;
    debug!(file = %file.display(), "level_saved");
    Ok(())
}

fn read_level(file: &Path) -> Result<SavedLevel> {
    let bytes = fs::read(file).map_err(|e| io_error(file, "read", e))?;
    rmp_serde::from_slice(&bytes).map_err(|e| io_error(file, "decode", e))
}
