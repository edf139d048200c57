//! Scenario harness for Stagehand.
//!
//! This crate provides:
//! - [`Reporter`] - The line-oriented record stream the outer harness scrapes
//! - [`Session`] - A scenario's handle on the editor, extended per concern:
//!   - `wait` - deadline waits over idle ticks
//!   - `bus` - typed calls and scoped [`Subscription`]s
//!   - `level` - create/open/save/reload with readiness drains
//!   - `entity` - [`EntityHandle`] and [`ComponentHandle`] operations
//!   - `prefab` - [`PrefabInstance`] operations that settle propagation
//!   - `validate` - post-condition checks that emit one record per assertion
//! - [`run_scenario`] - Prelude, postlude, and error containment for a [`Scenario`]
//!
//! Everything runs on the caller's thread. The editor only advances while the
//! harness waits, so records never race engine activity.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bus;
pub mod config;
pub mod entity;
pub mod error;
pub mod level;
pub mod prefab;
pub mod report;
pub mod scenario;
pub mod session;
pub mod validate;
pub mod wait;

pub use bus::Subscription;
pub use config::HarnessConfig;
pub use entity::{ComponentHandle, Contact, EntityHandle};
pub use error::{FatalScenario, HarnessError, HarnessResult};
pub use level::LevelParams;
pub use prefab::{PrefabInstance, PrefabTemplate};
pub use report::{LabelPair, Reporter, RESULT_FAILURE, RESULT_SUCCESS};
pub use scenario::{
    run_scenario, LevelPolicy, Scenario, ScenarioConfig, ScenarioOutcome, SettingsGuard,
};
pub use session::Session;
pub use validate::ExpectedTree;
pub use wait::Deadline;
