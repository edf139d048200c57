//! Harness error types.

use std::fmt;

use stagehand_foundation::{Error, ErrorKind};
use thiserror::Error;

/// A failed critical record. Unwinds the running scenario to the driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FatalScenario {
    /// The fail label that was recorded.
    pub label: String,
}

impl fmt::Display for FatalScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "critical check failed: {}", self.label)
    }
}

/// Errors crossing the harness facades.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A bus call failed.
    #[error(transparent)]
    Engine(#[from] Error),

    /// A critical record failed; only the scenario driver handles this.
    #[error("{0}")]
    Fatal(FatalScenario),

    /// `wait_for` was called from inside a wait predicate.
    #[error("wait_for called from inside a wait predicate")]
    NestedWait,

    /// The scenario panicked.
    #[error("scenario panicked: {0}")]
    Panicked(String),

    /// The scenario was started with unusable arguments.
    #[error("usage: {0}")]
    Usage(String),
}

impl From<FatalScenario> for HarnessError {
    fn from(fatal: FatalScenario) -> Self {
        Self::Fatal(fatal)
    }
}

impl HarnessError {
    /// Returns true once the editor is gone; nothing further can succeed.
    #[must_use]
    pub fn is_engine_lost(&self) -> bool {
        matches!(self, Self::Engine(e) if matches!(e.kind, ErrorKind::EngineLost))
    }

    /// Returns the engine error kind, if this wraps one.
    #[must_use]
    pub fn engine_kind(&self) -> Option<&ErrorKind> {
        match self {
            Self::Engine(e) => Some(&e.kind),
            _ => None,
        }
    }
}

/// Result type alias for harness operations.
pub type HarnessResult<T> = std::result::Result<T, HarnessError>;
