//! Entity, component, and hierarchy storage for Stagehand.
//!
//! This crate provides:
//! - [`EntityStore`] - Generational entity allocation
//! - [`ComponentStore`] - Per-entity components with service-based conflict rules
//! - [`Hierarchy`] - Ordered parent/child links
//! - [`World`] - Immutable world state with structural sharing

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod component;
pub mod entity;
pub mod hierarchy;
pub mod schema;
pub mod world;

pub use component::{ActivationState, ComponentInstance, ComponentStore};
pub use entity::EntityStore;
pub use hierarchy::Hierarchy;
pub use schema::{ComponentSchema, FieldSchema};
pub use world::{EntityRecord, World};
