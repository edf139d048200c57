//! Bundled smoke scenarios.
//!
//! Each scenario is a unit struct implementing [`Scenario`]; [`all`] lists
//! them in the order `--list` prints them.

mod components;
mod entities;
mod gameplay;
mod levels;
mod prefabs;

use stagehand_harness::Scenario;

pub use components::{ComponentConflicts, ComponentMode};
pub use entities::{CreateEntityUnderRoot, ReparentEntity};
pub use gameplay::ContactNotifications;
pub use levels::SaveAndReload;
pub use prefabs::{
    CreateNestedPrefab, CreateSinglePrefab, DeleteEntityInPrefab, DetachAndRemovePrefab,
    DuplicatePrefabUndoRedo, SavePrefabOverrides,
};

/// Every bundled scenario.
#[must_use]
pub fn all() -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(CreateEntityUnderRoot),
        Box::new(CreateSinglePrefab),
        Box::new(CreateNestedPrefab),
        Box::new(DeleteEntityInPrefab),
        Box::new(ComponentConflicts),
        Box::new(DuplicatePrefabUndoRedo),
        Box::new(ReparentEntity),
        Box::new(ComponentMode),
        Box::new(ContactNotifications),
        Box::new(SaveAndReload),
        Box::new(SavePrefabOverrides),
        Box::new(DetachAndRemovePrefab),
    ]
}

/// The scenario called `name`.
#[must_use]
pub fn find(name: &str) -> Option<Box<dyn Scenario>> {
    all().into_iter().find(|s| s.name() == name)
}
