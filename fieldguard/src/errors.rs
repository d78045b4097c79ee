//! Error types for fieldguard.
//!
//! Validator failures are never errors: they settle an [`Outcome`] as failed.
//! The types here cover the surface around the engine (configuration,
//! selectors, unknown fields).
//!
//! [`Outcome`]: crate::outcome::Outcome

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, FieldguardError>;

/// The main error type for fieldguard operations.
#[derive(Debug, Error)]
pub enum FieldguardError {
    /// A selector string could not be parsed.
    #[error("{0}")]
    InvalidSelector(#[from] InvalidSelectorError),

    /// A form operation referenced a field that was never inserted.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// The configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised when a selector string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid selector '{selector}': {reason}")]
pub struct InvalidSelectorError {
    /// The selector as written.
    pub selector: String,
    /// What went wrong.
    pub reason: String,
}

impl InvalidSelectorError {
    /// Creates a new invalid selector error.
    #[must_use]
    pub fn new(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            reason: reason.into(),
        }
    }
}
