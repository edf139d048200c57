//! Component type definitions.
//!
//! A schema names a component type, lists its labeled fields with defaults,
//! and declares the services it provides, requires, and cannot coexist with.
//! Two components conflict when one is incompatible with a service the other
//! provides; the later one is then added disabled.

use stagehand_foundation::{ComponentTypeId, FieldPath, Result, Type, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Schema for a single labeled field.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldSchema {
    /// Path of the field in the component's property tree.
    pub path: FieldPath,
    /// The field's type.
    pub field_type: Type,
    /// Value a new component starts with.
    pub default: Value,
}

impl FieldSchema {
    /// Creates a field whose type is taken from its default value.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a valid label path.
    pub fn new(path: &str, default: impl Into<Value>) -> Result<Self> {
        let default = default.into();
        Ok(Self {
            path: FieldPath::parse(path)?,
            field_type: default.value_type(),
            default,
        })
    }
}

/// Schema for a component type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComponentSchema {
    /// Registered type id.
    pub type_id: ComponentTypeId,
    /// Display name used to add components by type name.
    pub name: String,
    /// Field definitions, in inspector order.
    pub fields: Vec<FieldSchema>,
    /// Services this component provides.
    pub provides: Vec<String>,
    /// Services this component requires from another enabled component.
    pub requires: Vec<String>,
    /// Services this component cannot coexist with.
    pub incompatible: Vec<String>,
    /// Whether scenario code may remove this component.
    pub removable: bool,
}

impl ComponentSchema {
    /// Creates a schema with no fields and no service rules.
    #[must_use]
    pub fn new(type_id: ComponentTypeId, name: impl Into<String>) -> Self {
        Self {
            type_id,
            name: name.into(),
            fields: Vec::new(),
            provides: Vec::new(),
            requires: Vec::new(),
            incompatible: Vec::new(),
            removable: true,
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Declares a provided service.
    #[must_use]
    pub fn providing(mut self, service: impl Into<String>) -> Self {
        self.provides.push(service.into());
        self
    }

    /// Declares a required service.
    #[must_use]
    pub fn requiring(mut self, service: impl Into<String>) -> Self {
        self.requires.push(service.into());
        self
    }

    /// Declares an incompatible service.
    #[must_use]
    pub fn incompatible_with(mut self, service: impl Into<String>) -> Self {
        self.incompatible.push(service.into());
        self
    }

    /// Marks the component as permanent.
    #[must_use]
    pub fn permanent(mut self) -> Self {
        self.removable = false;
        self
    }

    /// Looks up a field by path.
    #[must_use]
    pub fn field(&self, path: &FieldPath) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| &f.path == path)
    }

    /// Returns true if this component provides `service`.
    #[must_use]
    pub fn provides_service(&self, service: &str) -> bool {
        self.provides.iter().any(|s| s == service)
    }

    /// Returns true if the two component types cannot both be enabled.
    #[must_use]
    pub fn conflicts_with(&self, other: &ComponentSchema) -> bool {
        self.incompatible.iter().any(|s| other.provides_service(s))
            || other.incompatible.iter().any(|s| self.provides_service(s))
    }
}
