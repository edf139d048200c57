//! Dynamically typed values carried by bus calls and component fields.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entity::{AssetId, ComponentRef, EntityId};
use crate::error::Error;
use crate::math::Vec3;
use crate::types::Type;

/// Core value type for bus arguments, bus results, and component fields.
///
/// Values are cheaply cloneable for every scalar variant; strings share their
/// buffer through `Arc`.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// The nil value (represents absence).
    #[default]
    Nil,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value.
    String(Arc<str>),
    /// Translation vector.
    Vec3(Vec3),
    /// Entity reference.
    Entity(EntityId),
    /// Component reference.
    Component(ComponentRef),
    /// Asset catalog id.
    Asset(AssetId),
    /// List of values.
    List(Vec<Value>),
}

impl Value {
    /// Returns the type of this value.
    #[must_use]
    pub fn value_type(&self) -> Type {
        match self {
            Self::Nil => Type::Nil,
            Self::Bool(_) => Type::Bool,
            Self::Int(_) => Type::Int,
            Self::Float(_) => Type::Float,
            Self::String(_) => Type::String,
            Self::Vec3(_) => Type::Vec3,
            Self::Entity(_) => Type::Entity,
            Self::Component(_) => Type::Component,
            Self::Asset(_) => Type::Asset,
            Self::List(_) => Type::List,
        }
    }

    /// Returns true if this is nil.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns the boolean if this is a bool.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if this is an int.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the number as a float, widening ints.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the string slice if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the vector if this is a vec3.
    #[must_use]
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the entity if this is an entity reference.
    #[must_use]
    pub fn as_entity(&self) -> Option<EntityId> {
        match self {
            Self::Entity(e) => Some(*e),
            _ => None,
        }
    }

    /// Returns the component reference if this is one.
    #[must_use]
    pub fn as_component(&self) -> Option<ComponentRef> {
        match self {
            Self::Component(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the asset id if this is one.
    #[must_use]
    pub fn as_asset(&self) -> Option<AssetId> {
        match self {
            Self::Asset(a) => Some(*a),
            _ => None,
        }
    }

    /// Returns the list elements if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Converts this value into `expected`, applying int-to-float widening.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if the value cannot be stored as `expected`.
    #[allow(clippy::cast_precision_loss)]
    pub fn coerce(self, expected: &Type) -> crate::Result<Value> {
        let actual = self.value_type();
        if !expected.accepts(&actual) {
            return Err(Error::type_mismatch(expected.clone(), actual));
        }
        Ok(match (expected, self) {
            (Type::Float, Value::Int(i)) => Value::Float(i as f64),
            (_, value) => value,
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Vec3(v) => write!(f, "{v}"),
            Self::Entity(e) => write!(f, "{e}"),
            Self::Component(c) => write!(f, "{c}"),
            Self::Asset(a) => write!(f, "{a}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// =============================================================================
// Conversions into Value
// =============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<EntityId> for Value {
    fn from(e: EntityId) -> Self {
        Self::Entity(e)
    }
}

impl From<ComponentRef> for Value {
    fn from(c: ComponentRef) -> Self {
        Self::Component(c)
    }
}

impl From<AssetId> for Value {
    fn from(a: AssetId) -> Self {
        Self::Asset(a)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Nil, Into::into)
    }
}

// =============================================================================
// Conversions out of Value
// =============================================================================

/// Typed extraction of a bus result.
pub trait FromValue: Sized {
    /// Converts the value, failing with a type mismatch.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch error when the value has the wrong shape.
    fn from_value(value: Value) -> crate::Result<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> crate::Result<Self> {
        Ok(value)
    }
}

impl FromValue for () {
    fn from_value(_value: Value) -> crate::Result<Self> {
        Ok(())
    }
}

macro_rules! from_value_via {
    ($ty:ty, $accessor:ident, $expected:expr) => {
        impl FromValue for $ty {
            fn from_value(value: Value) -> crate::Result<Self> {
                value
                    .$accessor()
                    .ok_or_else(|| Error::type_mismatch($expected, value.value_type()))
            }
        }
    };
}

from_value_via!(bool, as_bool, Type::Bool);
from_value_via!(i64, as_int, Type::Int);
from_value_via!(f64, as_float, Type::Float);
from_value_via!(Vec3, as_vec3, Type::Vec3);
from_value_via!(EntityId, as_entity, Type::Entity);
from_value_via!(ComponentRef, as_component, Type::Component);
from_value_via!(AssetId, as_asset, Type::Asset);

impl FromValue for String {
    fn from_value(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s.to_string()),
            other => Err(Error::type_mismatch(Type::String, other.value_type())),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> crate::Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(Error::type_mismatch(Type::List, other.value_type())),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> crate::Result<Self> {
        if value.is_nil() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}
