//! Labeled property paths into a component's property tree.
//!
//! Scenario code addresses component fields with the labels shown in the
//! inspector, separated by `|` or `.`: `"Box Configuration|Dimensions"` and
//! `"Box Configuration.Dimensions"` name the same field.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};

/// A parsed, canonical field path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Separator used in the canonical form.
    pub const SEPARATOR: char = '|';

    /// Parses a dot- or pipe-separated label path.
    ///
    /// Whitespace around each label is trimmed; empty labels are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or contains an empty label.
    pub fn parse(raw: &str) -> crate::Result<Self> {
        let segments: Vec<String> = raw
            .split(['|', '.'])
            .map(|s| s.trim().to_string())
            .collect();
        if segments.iter().any(String::is_empty) {
            return Err(Error::new(ErrorKind::InvalidFieldPath(raw.to_string())));
        }
        Ok(Self { segments })
    }

    /// Returns the labels of this path.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the last label.
    #[must_use]
    pub fn leaf(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// Returns true if `self` is `prefix` or lies beneath it.
    #[must_use]
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self
                .segments
                .iter()
                .zip(&prefix.segments)
                .all(|(a, b)| a == b)
    }
}

impl FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", Self::SEPARATOR)?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
