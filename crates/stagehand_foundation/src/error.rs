//! Error types for the Stagehand system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::entity::{ComponentRef, EntityId};
use crate::types::Type;

/// The main error type for Stagehand operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto this error's context, creating it if needed.
    #[must_use]
    pub fn in_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an invalid target error.
    #[must_use]
    pub fn invalid_target(id: EntityId) -> Self {
        Self::new(ErrorKind::InvalidTarget(id))
    }

    /// Creates a no-such-method error.
    #[must_use]
    pub fn no_such_method(bus: impl Into<String>, method: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoSuchMethod {
            bus: bus.into(),
            method: method.into(),
        })
    }

    /// Creates an arity mismatch error.
    #[must_use]
    pub fn arity_mismatch(expected: String, actual: usize) -> Self {
        Self::new(ErrorKind::ArityMismatch { expected, actual })
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true for the three bus contract failures: unknown target,
    /// unknown method, and malformed arguments.
    #[must_use]
    pub fn is_contract_failure(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::InvalidTarget(_)
                | ErrorKind::NoSuchMethod { .. }
                | ErrorKind::TypeMismatch { .. }
                | ErrorKind::ArityMismatch { .. }
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The addressed entity is unknown to the engine.
    #[error("invalid target: {0:?}")]
    InvalidTarget(EntityId),

    /// The bus has no such method.
    #[error("no such method: {bus}.{method}")]
    NoSuchMethod {
        /// The bus that was called.
        bus: String,
        /// The method name that was not found.
        method: String,
    },

    /// Type mismatch in a bus argument or field value.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: Type,
        /// The actual type encountered.
        actual: Type,
    },

    /// Wrong number of arguments to a bus method.
    #[error("arity mismatch: expected {expected}, got {actual}")]
    ArityMismatch {
        /// Description of expected arity.
        expected: String,
        /// Actual number of arguments.
        actual: usize,
    },

    /// No component type is registered under this name.
    #[error("unknown component type: {0}")]
    UnknownComponentType(String),

    /// A component requires a service no enabled component provides.
    #[error("component {component} requires service {service}")]
    MissingService {
        /// The component being added.
        component: String,
        /// The service it needs.
        service: String,
    },

    /// The component reference no longer resolves.
    #[error("component not found: {0}")]
    ComponentNotFound(ComponentRef),

    /// The labeled path does not exist in the component's property tree.
    #[error("field not found: {path} on component {component}")]
    FieldNotFound {
        /// The component type name.
        component: String,
        /// The requested path.
        path: String,
    },

    /// The labeled path could not be parsed.
    #[error("invalid field path: {0:?}")]
    InvalidFieldPath(String),

    /// The operation edits a prefab that is not focused.
    #[error("prefab owning {entity:?} is not focused")]
    NotFocused {
        /// The entity whose owning prefab must be focused.
        entity: EntityId,
    },

    /// Reparenting would make an entity its own ancestor.
    #[error("reparenting {entity:?} under {parent:?} would create a cycle")]
    ReparentCycle {
        /// The entity being moved.
        entity: EntityId,
        /// The requested parent.
        parent: EntityId,
    },

    /// The prefab template could not be persisted.
    #[error("cannot write prefab template {path}: {reason}")]
    TemplateWriteFailed {
        /// The requested template path.
        path: String,
        /// Why the write failed.
        reason: String,
    },

    /// No template is known at this path.
    #[error("prefab template not found: {0}")]
    TemplateNotFound(String),

    /// The entity is not a prefab instance container.
    #[error("{0:?} is not a prefab instance container")]
    NotAnInstance(EntityId),

    /// The operation is not allowed on this entity.
    #[error("operation not permitted on {entity:?}: {reason}")]
    NotPermitted {
        /// The entity the operation addressed.
        entity: EntityId,
        /// Why it was refused.
        reason: String,
    },

    /// The operation needs an open level.
    #[error("no level is loaded")]
    NoLevelLoaded,

    /// The editor process is gone.
    #[error("editor connection lost")]
    EngineLost,

    /// Persistence failure.
    #[error("i/o error: {0}")]
    Io(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The bus the failing call went through.
    pub bus: Option<String>,
    /// The method that failed.
    pub method: Option<String>,
    /// Frames the error crossed, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bus call location.
    #[must_use]
    pub fn with_call(mut self, bus: impl Into<String>, method: impl Into<String>) -> Self {
        self.bus = Some(bus.into());
        self.method = Some(method.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(bus), Some(method)) = (&self.bus, &self.method) {
            write!(f, "in {bus}.{method}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
