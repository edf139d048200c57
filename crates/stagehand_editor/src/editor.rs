//! The editor: open level, undo history, background work, and settings.
//!
//! Entity, component, and prefab operations live in sibling modules as
//! further `impl Editor` blocks. Every edit follows the same shape: clone the
//! scene, change the clone, then [`Editor::commit`] it, which records the old
//! scene for undo and queues a propagation cycle.

use stagehand_foundation::names::notify;
use stagehand_foundation::{Address, EntityId, Error, ErrorKind, Result, Value};
use stagehand_storage::World;
use tracing::{debug, info, warn};

use crate::assets::AssetCatalog;
use crate::catalog::builtin_world;
use crate::config::EditorConfig;
use crate::level::{LevelSettings, LevelStore, SavedLevel};
use crate::notify::NotificationHub;
use crate::scene::SceneState;
use crate::template::TemplateStore;
use crate::undo::UndoStack;
use crate::work::{WorkEvent, WorkQueue};

/// Default viewport size in pixels.
pub const DEFAULT_VIEWPORT: (i64, i64) = (1280, 720);

#[derive(Clone, Debug)]
struct OpenLevel {
    name: String,
    settings: LevelSettings,
    scene: SceneState,
    active: bool,
}

/// An in-process editor session.
#[derive(Debug)]
pub struct Editor {
    pub(crate) config: EditorConfig,
    /// Empty world with the built-in component types.
    blank: World,
    levels: LevelStore,
    pub(crate) templates: TemplateStore,
    pub(crate) assets: AssetCatalog,
    pub(crate) hub: NotificationHub,
    pub(crate) work: WorkQueue,
    undo: UndoStack,
    level: Option<OpenLevel>,
    /// Focused instance container; the level root when `None`.
    pub(crate) focused: Option<EntityId>,
    pub(crate) component_mode: Option<EntityId>,
    /// Edit-time scene, kept while game mode runs on a copy.
    game_mode: Option<SceneState>,
    viewport: (i64, i64),
    helpers_visible: bool,
    tick_count: u64,
    reload_in_progress: bool,
    alive: bool,
}

impl Editor {
    /// Creates an editor with no level open.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in component types fail to register.
    pub fn new(config: EditorConfig) -> Result<Self> {
        info!(content_root = ?config.content_root, "editor_started");
        Ok(Self {
            blank: builtin_world()?,
            levels: LevelStore::new(config.content_root.clone(), config.max_level_path),
            templates: TemplateStore::new(config.content_root.clone()),
            assets: AssetCatalog::new(),
            hub: NotificationHub::new(),
            work: WorkQueue::new(),
            undo: UndoStack::new(config.undo_limit),
            level: None,
            focused: None,
            component_mode: None,
            game_mode: None,
            viewport: DEFAULT_VIEWPORT,
            helpers_visible: true,
            tick_count: 0,
            reload_in_progress: false,
            alive: true,
            config,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub(crate) fn ensure_alive(&self) -> Result<()> {
        if self.alive {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::EngineLost))
        }
    }

    // --- Levels ---

    /// Creates and opens a level. Returns false if the name is taken or the
    /// name or settings are invalid.
    pub fn create_level(&mut self, name: &str, settings: LevelSettings) -> bool {
        let problem = self
            .levels
            .name_problem(name)
            .or_else(|| settings.problem().map(String::from));
        if let Some(problem) = problem {
            warn!(level = name, %problem, "create_level_refused");
            return false;
        }
        let scene = match SceneState::new(self.blank.clone(), name) {
            Ok(scene) => scene,
            Err(err) => {
                warn!(level = name, error = %err, "create_level_failed");
                return false;
            }
        };
        let saved = SavedLevel {
            settings,
            scene: scene.clone(),
        };
        if let Err(err) = self.levels.save(name, saved) {
            warn!(level = name, error = %err, "create_level_failed");
            return false;
        }
        info!(level = name, "level_created");
        self.install_level(name, settings, scene, false);
        true
    }

    /// Opens a saved level. Returns false if it does not exist.
    pub fn open_level(&mut self, name: &str) -> bool {
        match self.levels.load(name) {
            Ok(Some(saved)) => {
                let reload = self.level.is_some();
                info!(level = name, reload, "level_opening");
                self.install_level(name, saved.settings, saved.scene, reload);
                true
            }
            Ok(None) => {
                warn!(level = name, "open_level_not_found");
                false
            }
            Err(err) => {
                warn!(level = name, error = %err, "open_level_failed");
                false
            }
        }
    }

    /// Saves the open level.
    ///
    /// # Errors
    ///
    /// Returns `NoLevelLoaded` if no level is open.
    pub fn save_level(&mut self) -> Result<bool> {
        let level = self
            .level
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::NoLevelLoaded))?;
        let scene = self.game_mode.as_ref().unwrap_or(&level.scene).clone();
        let name = level.name.clone();
        let saved = SavedLevel {
            settings: level.settings,
            scene,
        };
        match self.levels.save(&name, saved) {
            Ok(()) => {
                info!(level = %name, "level_saved");
                Ok(true)
            }
            Err(err) => {
                warn!(level = %name, error = %err, "save_level_failed");
                Ok(false)
            }
        }
    }

    /// Reopens the current level from its last save.
    ///
    /// # Errors
    ///
    /// Returns `NoLevelLoaded` if no level is open.
    pub fn reload_level(&mut self) -> Result<bool> {
        let name = self
            .current_level_name()
            .ok_or_else(|| Error::new(ErrorKind::NoLevelLoaded))?
            .to_string();
        Ok(self.open_level(&name))
    }

    fn install_level(
        &mut self,
        name: &str,
        settings: LevelSettings,
        scene: SceneState,
        reload: bool,
    ) {
        self.game_mode = None;
        self.work.clear_scene_work();
        self.undo.clear();
        self.focused = None;
        self.component_mode = None;
        self.level = Some(OpenLevel {
            name: name.to_string(),
            settings,
            scene,
            active: false,
        });
        self.reload_in_progress = reload;
        self.work.queue_level_load(self.config.level_load_ticks);
    }

    /// Shuts the editor down. Every later bus call fails with `EngineLost`.
    pub fn close(&mut self) {
        if self.alive {
            info!(ticks = self.tick_count, "editor_closed");
        }
        self.alive = false;
        self.level = None;
        self.game_mode = None;
        self.hub.clear();
        self.work.clear();
    }

    /// Returns false once the editor was closed.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Name of the open level.
    #[must_use]
    pub fn current_level_name(&self) -> Option<&str> {
        self.level.as_ref().map(|l| l.name.as_str())
    }

    /// True once the open level finished loading.
    #[must_use]
    pub fn is_level_active(&self) -> bool {
        self.level.as_ref().is_some_and(|l| l.active)
    }

    /// True while a reopen of a level is loading.
    #[must_use]
    pub fn is_reload_in_progress(&self) -> bool {
        self.reload_in_progress
    }

    /// Number of queued background jobs.
    #[must_use]
    pub fn pending_work(&self) -> usize {
        self.work.len()
    }

    /// Number of ticks run so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // --- Scene access ---

    /// Returns the open level's scene.
    ///
    /// # Errors
    ///
    /// Returns `NoLevelLoaded` if no level is open.
    pub fn scene(&self) -> Result<&SceneState> {
        self.level
            .as_ref()
            .map(|l| &l.scene)
            .ok_or_else(|| Error::new(ErrorKind::NoLevelLoaded))
    }

    /// Installs an edited scene as one undoable step and queues propagation.
    pub(crate) fn commit(&mut self, label: &str, next: SceneState) -> Result<()> {
        let level = self
            .level
            .as_mut()
            .ok_or_else(|| Error::new(ErrorKind::NoLevelLoaded))?;
        let before = std::mem::replace(&mut level.scene, next);
        if self.game_mode.is_none() {
            self.undo.record(label, before);
        }
        self.work
            .queue_propagation(self.config.propagation_ticks, None);
        debug!(label, "edit_committed");
        Ok(())
    }

    /// Replaces the scene without recording undo history.
    pub(crate) fn replace_scene(&mut self, scene: SceneState) {
        if let Some(level) = self.level.as_mut() {
            level.scene = scene;
        }
    }

    /// The instance hierarchy edits are currently accepted in.
    pub(crate) fn focus_root(&self, scene: &SceneState) -> EntityId {
        self.focused
            .filter(|f| scene.world.exists(*f) && scene.is_container(*f))
            .unwrap_or(scene.level_root)
    }

    /// Fails unless the prefab owning `parent` is focused.
    pub(crate) fn require_focus(&self, scene: &SceneState, parent: EntityId) -> Result<()> {
        let owner = scene.owning_instance(parent);
        if owner == self.focus_root(scene) {
            Ok(())
        } else {
            warn!(%parent, %owner, "edit_outside_focus");
            Err(Error::new(ErrorKind::NotFocused { entity: parent }))
        }
    }

    /// Fails unless children may be moved out of `parent`: its prefab is the
    /// focused one or encloses it.
    pub(crate) fn require_release(&self, scene: &SceneState, parent: EntityId) -> Result<()> {
        let owner = scene.owning_instance(parent);
        let focus = self.focus_root(scene);
        if owner == focus || scene.world.ancestors(focus).any(|a| a == owner) {
            Ok(())
        } else {
            warn!(%parent, %owner, %focus, "release_outside_focus");
            Err(Error::new(ErrorKind::NotFocused { entity: parent }))
        }
    }

    /// Marks the focused instance modified if `entity` belongs to it.
    pub(crate) fn touch(&self, scene: &mut SceneState, entity: EntityId) {
        let owner = scene.owning_instance(entity);
        if owner != scene.level_root && owner == self.focus_root(scene) {
            if let Some(link) = scene.instances.get_mut(&owner) {
                link.modified = true;
            }
        }
    }

    // --- Undo ---

    /// Reverts the last edit. Returns false when there is nothing to undo or
    /// game mode is running.
    ///
    /// # Errors
    ///
    /// Returns `NoLevelLoaded` if no level is open.
    pub fn undo(&mut self) -> Result<bool> {
        self.step_history(true)
    }

    /// Reapplies the last undone edit. Returns false when there is nothing
    /// to redo or game mode is running.
    ///
    /// # Errors
    ///
    /// Returns `NoLevelLoaded` if no level is open.
    pub fn redo(&mut self) -> Result<bool> {
        self.step_history(false)
    }

    fn step_history(&mut self, backwards: bool) -> Result<bool> {
        let level = self
            .level
            .as_mut()
            .ok_or_else(|| Error::new(ErrorKind::NoLevelLoaded))?;
        if self.game_mode.is_some() {
            return Ok(false);
        }
        let current = level.scene.clone();
        let stepped = if backwards {
            self.undo.undo(current)
        } else {
            self.undo.redo(current)
        };
        let Some((scene, label)) = stepped else {
            return Ok(false);
        };
        level.scene = scene;
        info!(label = %label, undo = backwards, "history_step");
        self.work
            .queue_propagation(self.config.propagation_ticks, None);
        Ok(true)
    }

    // --- Game mode ---

    /// Starts game mode on a copy of the scene.
    ///
    /// # Errors
    ///
    /// Returns `NoLevelLoaded` if no level is open.
    pub fn enter_game_mode(&mut self) -> Result<()> {
        let scene = self.scene()?.clone();
        if self.game_mode.is_none() {
            self.leave_component_mode();
            self.game_mode = Some(scene);
            info!("game_mode_entered");
        }
        Ok(())
    }

    /// Stops game mode and restores the edit-time scene.
    pub fn exit_game_mode(&mut self) {
        if let Some(scene) = self.game_mode.take() {
            self.replace_scene(scene);
            info!("game_mode_exited");
        }
    }

    /// True while game mode runs.
    #[must_use]
    pub fn is_in_game_mode(&self) -> bool {
        self.game_mode.is_some()
    }

    // --- Settings ---

    /// Viewport size in pixels.
    #[must_use]
    pub fn viewport_size(&self) -> (i64, i64) {
        self.viewport
    }

    /// Resizes the viewport.
    ///
    /// # Errors
    ///
    /// Returns `NotPermitted` for non-positive sizes.
    pub fn set_viewport_size(&mut self, width: i64, height: i64) -> Result<()> {
        if width <= 0 || height <= 0 {
            return Err(Error::new(ErrorKind::NotPermitted {
                entity: EntityId::null(),
                reason: format!("viewport size {width}x{height} is not positive"),
            }));
        }
        self.viewport = (width, height);
        Ok(())
    }

    /// Whether viewport helpers are drawn.
    #[must_use]
    pub fn helpers_visible(&self) -> bool {
        self.helpers_visible
    }

    /// Shows or hides viewport helpers.
    pub fn set_helpers_visible(&mut self, visible: bool) {
        self.helpers_visible = visible;
    }

    // --- Ticks ---

    /// Runs one idle tick: advances background work and emits notifications.
    ///
    /// # Errors
    ///
    /// Returns `EngineLost` once the editor was closed.
    pub fn tick(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.tick_count += 1;

        for event in self.work.advance() {
            match event {
                WorkEvent::PropagationBegan => {
                    self.hub.emit(
                        notify::PREFAB,
                        Address::Broadcast,
                        notify::PROPAGATION_BEGIN,
                        Vec::new(),
                    );
                }
                WorkEvent::PropagationEnded { rebuild } => {
                    if !rebuild.is_empty() && self.game_mode.is_none() {
                        self.apply_rebuilds(&rebuild);
                    }
                    self.hub.emit(
                        notify::PREFAB,
                        Address::Broadcast,
                        notify::PROPAGATION_END,
                        Vec::new(),
                    );
                }
                WorkEvent::AssetReady(path) => {
                    let id = self.assets.register(&path);
                    debug!(%path, asset = %id, "asset_registered");
                }
                WorkEvent::LevelLoaded => {
                    self.reload_in_progress = false;
                    if let Some(level) = self.level.as_mut() {
                        level.active = true;
                        let root = level.scene.level_root;
                        info!(level = %level.name, "level_active");
                        self.hub.emit(
                            notify::PREFAB,
                            Address::Broadcast,
                            notify::ROOT_INSTANCE_LOADED,
                            vec![Value::from(root)],
                        );
                    }
                }
            }
        }
        Ok(())
    }
}
