//! Type descriptors for bus argument and component field validation.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type descriptor for argument and field validation.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    /// The nil type (only value: nil).
    Nil,
    /// Boolean type.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// String type.
    String,
    /// Translation vector.
    Vec3,
    /// Entity reference.
    Entity,
    /// Component reference.
    Component,
    /// Asset catalog id.
    Asset,
    /// Heterogeneous list.
    List,
    /// Optional type (value or nil).
    Option(Box<Type>),
    /// Any type (accepts any value).
    Any,
}

impl Type {
    /// Creates an optional type.
    #[must_use]
    pub fn option(inner: Type) -> Self {
        Self::Option(Box::new(inner))
    }

    /// Checks whether a value of type `actual` may be stored where `self` is expected.
    ///
    /// Integers widen to floats; nothing else converts implicitly.
    #[must_use]
    pub fn accepts(&self, actual: &Type) -> bool {
        match (self, actual) {
            (Self::Any, _) | (Self::Float, Self::Int) => true,
            (Self::Option(_), Self::Nil) => true,
            (Self::Option(inner), other) => inner.accepts(other),
            (expected, actual) => expected == actual,
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
            Self::Vec3 => write!(f, "vec3"),
            Self::Entity => write!(f, "entity"),
            Self::Component => write!(f, "component"),
            Self::Asset => write!(f, "asset"),
            Self::List => write!(f, "list"),
            Self::Option(inner) => write!(f, "{inner}?"),
            Self::Any => write!(f, "any"),
        }
    }
}
