//! Stagehand - Scenario harness for an in-process game editor
//!
//! This crate re-exports all layers of the Stagehand system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 4: stagehand_runtime    — CLI, bundled scenarios, logging setup
//! Layer 3: stagehand_harness    — Reporter, waits, bus/level/entity/prefab facades, driver
//! Layer 2: stagehand_editor     — In-process editor answering the request buses
//! Layer 1: stagehand_storage    — Entity, component, and hierarchy snapshots
//! Layer 0: stagehand_foundation — Core types (Value, EntityId, Error, bus contract)
//! ```

pub use stagehand_editor as editor;
pub use stagehand_foundation as foundation;
pub use stagehand_harness as harness;
pub use stagehand_runtime as runtime;
pub use stagehand_storage as storage;
