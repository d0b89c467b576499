//! Path-qualified field errors and declarative immutable-field checking.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single admission failure, qualified by the field path it refers to.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{path}: {message}")]
pub struct FieldError {
    /// Dotted path to the offending field, e.g. `spec.topic`.
    pub path: String,
    /// Human-readable failure description.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// A required field is missing or empty.
    #[must_use]
    pub fn missing(path: impl Into<String>) -> Self {
        Self::new(path, "missing or empty")
    }

    /// A field holds a value outside its allowed set.
    #[must_use]
    pub fn invalid_value(path: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::new(path, format!("invalid value '{value}'"))
    }

    /// An immutable field changed between the original and updated resource.
    #[must_use]
    pub fn immutable(path: impl Into<String>) -> Self {
        Self::new(path, "immutable field updated")
    }

    /// Prefixes the field path, for validation that recurses into nested
    /// specs.
    #[must_use]
    pub fn via_field(mut self, prefix: &str) -> Self {
        self.path = if self.path.is_empty() {
            prefix.to_string()
        } else {
            format!("{prefix}.{}", self.path)
        };
        self
    }
}

/// A field marked immutable on a resource spec.
///
/// Immutability is declared as data (a path plus a comparator), so the
/// update check is one generic walk over the list instead of a hand-written
/// comparison per field.
pub struct ImmutableField<T> {
    /// Dotted path reported when the field changes.
    pub path: &'static str,
    /// Returns true when the field differs between original and updated.
    pub differs: fn(&T, &T) -> bool,
}

impl<T> fmt::Debug for ImmutableField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImmutableField")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Walks a declarative immutable-field list, reporting every field that
/// changed between `original` and `updated`.
#[must_use]
pub fn check_immutable<T>(
    fields: &[ImmutableField<T>],
    original: &T,
    updated: &T,
) -> Vec<FieldError> {
    fields
        .iter()
        .filter(|f| (f.differs)(original, updated))
        .map(|f| FieldError::immutable(f.path))
        .collect()
}
