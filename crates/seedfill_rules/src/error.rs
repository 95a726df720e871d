//! Error types for rule generation and validation.

use thiserror::Error;

/// Errors raised by rules while generating or validating values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The value handed to a rule has the wrong runtime type.
    #[error("expected {expected}, got {actual}")]
    UnexpectedType {
        /// Type the rule accepts.
        expected: &'static str,
        /// Runtime type of the offending value.
        actual: String,
    },

    /// The value has the right type but fails the rule's constraints.
    #[error("{0}")]
    Invalid(String),

    /// A rule was constructed with parameters it cannot work with.
    #[error("invalid rule configuration: {0}")]
    Config(String),

    /// Failure reported by a user-supplied rule.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates a failure for a user-supplied rule.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// Result type alias for rule operations.
pub type Result<T> = std::result::Result<T, Error>;
