//! Core types shared by every Stagehand layer.
//!
//! This crate provides:
//! - [`EntityId`], [`ComponentRef`], [`AssetId`] - Engine-side identifiers
//! - [`Vec3`] - Translation math with tolerance comparison
//! - [`Value`] and [`Type`] - Dynamically typed bus arguments and field values
//! - [`FieldPath`] - Labeled property paths (`"Box Shape|Dimensions"`)
//! - [`Error`] - Rich error types with context
//! - [`EditorBus`] - The broadcast/event/notification contract the harness drives

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bus;
pub mod entity;
pub mod error;
pub mod math;
pub mod names;
pub mod path;
pub mod types;
pub mod value;

pub use bus::{Address, EditorBus, HandlerId, Notification};
pub use entity::{AssetId, ComponentId, ComponentRef, ComponentTypeId, EntityId};
pub use error::{Error, ErrorContext, ErrorKind};
pub use math::Vec3;
pub use path::FieldPath;
pub use types::Type;
pub use value::{FromValue, Value};

/// Result type alias using the Stagehand error type.
pub type Result<T> = std::result::Result<T, Error>;
