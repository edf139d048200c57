//! In-process editor for Stagehand.
//!
//! This crate provides:
//! - [`Editor`] - Levels, entities, components, prefabs, and undo history
//!   behind the [`EditorBus`](stagehand_foundation::EditorBus) contract
//! - [`EditorConfig`] - Tick costs of background work and persistence roots
//! - [`TemplateStore`] - Prefab templates captured from and materialized into scenes
//! - [`WorkQueue`] - Propagation cycles, asset processing, and level loads
//!
//! Nothing here runs on its own. Background work only advances when
//! [`Editor::tick`] is called, which is what makes scenario runs
//! deterministic.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod args;
pub mod assets;
pub mod catalog;
pub mod config;
mod dispatch;
pub mod editor;
mod entities;
pub mod level;
pub mod notify;
mod prefabs;
pub mod scene;
pub mod template;
pub mod undo;
pub mod work;

pub use assets::AssetCatalog;
pub use config::EditorConfig;
pub use editor::Editor;
pub use level::{LevelSettings, LevelStore};
pub use notify::NotificationHub;
pub use scene::{InstanceLink, SceneState};
pub use template::{PrefabTemplate, TemplateNode, TemplateStore};
pub use undo::UndoStack;
pub use work::WorkQueue;
