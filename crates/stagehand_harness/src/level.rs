//! Level lifecycle: bring the editor to a loaded, idle level and back.
//!
//! Create, open and reload report refusal as `false` and log it. A transition
//! only counts once the editor drained its queued work, reports the level
//! active, and has no reload in flight.

use stagehand_foundation::names::editor;
use stagehand_foundation::Value;
use tracing::{info, warn};

use crate::error::HarnessResult;
use crate::session::Session;

/// Terrain parameters for [`Session::create_level`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelParams {
    /// Heightmap resolution; a power of two.
    pub heightmap_resolution: i64,
    /// Heightmap meters per pixel.
    pub meters_per_pixel: f64,
    /// Terrain texture resolution; a power of two.
    pub texture_resolution: i64,
    /// Whether the level gets terrain.
    pub use_terrain: bool,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            heightmap_resolution: 1024,
            meters_per_pixel: 1.0,
            texture_resolution: 4096,
            use_terrain: false,
        }
    }
}

impl LevelParams {
    /// Enables terrain.
    #[must_use]
    pub fn with_terrain(mut self, use_terrain: bool) -> Self {
        self.use_terrain = use_terrain;
        self
    }

    /// Sets the heightmap resolution.
    #[must_use]
    pub fn with_heightmap_resolution(mut self, resolution: i64) -> Self {
        self.heightmap_resolution = resolution;
        self
    }

    fn to_args(self, name: &str) -> [Value; 5] {
        [
            Value::from(name),
            Value::Int(self.heightmap_resolution),
            Value::Float(self.meters_per_pixel),
            Value::Int(self.texture_resolution),
            Value::Bool(self.use_terrain),
        ]
    }
}

impl Session {
    /// Creates and opens a level. Returns false if the name is taken or the
    /// parameters are refused, or if the level never became ready.
    ///
    /// # Errors
    ///
    /// Returns an error only when the editor is unreachable.
    pub fn create_level(&mut self, name: &str, params: &LevelParams) -> HarnessResult<bool> {
        let created: bool =
            self.broadcast(editor::BUS, editor::CREATE_LEVEL, &params.to_args(name))?;
        if !created {
            warn!(level = name, "level_create_refused");
            self.info(format_args!("Could not create level {name}"));
            return Ok(false);
        }
        info!(level = name, "level_created");
        self.drain_level()
    }

    /// Opens an existing level. Returns false if it does not exist or never
    /// became ready.
    ///
    /// # Errors
    ///
    /// Returns an error only when the editor is unreachable.
    pub fn open_level(&mut self, name: &str) -> HarnessResult<bool> {
        let opened: bool = self.broadcast(editor::BUS, editor::OPEN_LEVEL, &[Value::from(name)])?;
        if !opened {
            warn!(level = name, "level_open_refused");
            self.info(format_args!("Could not open level {name}"));
            return Ok(false);
        }
        info!(level = name, "level_opened");
        self.drain_level()
    }

    /// Persists the open level.
    ///
    /// # Errors
    ///
    /// Returns an error if no level is open or the write failed.
    pub fn save_level(&mut self) -> HarnessResult<bool> {
        let saved: bool = self.broadcast(editor::BUS, editor::SAVE_LEVEL, &[])?;
        if !saved {
            warn!("level_save_refused");
        }
        Ok(saved)
    }

    /// Reloads the open level from its last save and waits until it is ready.
    ///
    /// # Errors
    ///
    /// Returns an error if no level is open.
    pub fn reload_level(&mut self) -> HarnessResult<bool> {
        let reloading: bool = self.broadcast(editor::BUS, editor::RELOAD_LEVEL, &[])?;
        if !reloading {
            warn!("level_reload_refused");
            return Ok(false);
        }
        self.drain_level()
    }

    /// The open level's name.
    ///
    /// # Errors
    ///
    /// Returns an error only when the editor is unreachable.
    pub fn current_level_name(&mut self) -> HarnessResult<Option<String>> {
        Ok(self.broadcast(editor::BUS, editor::GET_CURRENT_LEVEL_NAME, &[])?)
    }

    /// Ticks until queued work is done, the level is active, and no reload is
    /// in progress. Returns false on timeout.
    ///
    /// # Errors
    ///
    /// Returns an error only when the editor is unreachable.
    pub fn drain_level(&mut self) -> HarnessResult<bool> {
        let timeout = self.config.level_timeout;
        let ready = self.wait_for(timeout, |s| {
            let pending: i64 = s.broadcast(editor::BUS, editor::PENDING_WORK_COUNT, &[])?;
            if pending > 0 {
                return Ok(false);
            }
            let active: bool = s.broadcast(editor::BUS, editor::IS_LEVEL_ACTIVE, &[])?;
            let reloading: bool = s.broadcast(editor::BUS, editor::IS_RELOAD_IN_PROGRESS, &[])?;
            Ok(active && !reloading)
        })?;
        if ready {
            info!("level_ready");
        } else {
            warn!(?timeout, "level_not_ready");
            self.info("Level did not become ready in time");
        }
        Ok(ready)
    }

    /// Shuts the editor down. Safe to call at any point, repeatedly.
    pub fn close_editor_gracefully(&mut self) {
        if !self.is_alive() {
            return;
        }
        self.dispatch_notifications();
        if let Err(err) = self.broadcast::<()>(editor::BUS, editor::CLOSE_EDITOR, &[]) {
            warn!(error = %err, "close_failed");
        }
        info!("editor_closed");
    }
}
