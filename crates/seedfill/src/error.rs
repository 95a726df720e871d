//! Error types for population.

use thiserror::Error;

/// Errors that can occur while populating records.
#[derive(Debug, Error)]
pub enum Error {
    /// A directive names a rule the active rule set does not hold.
    #[error("rule '{rule}' not found")]
    RuleNotFound {
        /// Name of the missing rule.
        rule: String,
    },

    /// A rule failed to produce a value.
    #[error("generation failed for rule '{rule}': {source}")]
    Generation {
        /// Name of the failing rule.
        rule: String,
        /// Error reported by the rule.
        source: seedfill_rules::Error,
    },

    /// A rule rejected the value it produced.
    #[error("validation failed for rule '{rule}' with value {value}: {source}")]
    Validation {
        /// Name of the rule.
        rule: String,
        /// Rendered offending value.
        value: String,
        /// Error reported by the rule.
        source: seedfill_rules::Error,
    },

    /// The produced value cannot be assigned to the field's type.
    #[error("type mismatch: cannot assign {actual} to {expected}")]
    TypeMismatch {
        /// Declared type of the destination.
        expected: String,
        /// Runtime type of the produced value.
        actual: String,
    },

    /// A numeric conversion would not fit the destination width.
    #[error("value {value} is out of range for {target}")]
    OutOfRange {
        /// Rendered value.
        value: String,
        /// Destination type.
        target: String,
    },

    /// A record was asked to set a field it does not declare.
    #[error("record {record} has no field '{field}'")]
    UnknownField {
        /// Record type name.
        record: &'static str,
        /// Requested field name.
        field: String,
    },

    /// Failure while populating a specific field.
    #[error("field '{field}': {source}")]
    Field {
        /// Field name.
        field: String,
        /// Underlying failure.
        source: Box<Error>,
    },

    /// Failure while populating one element of a collection.
    #[error("element {index}: {source}")]
    Element {
        /// Position of the element.
        index: usize,
        /// Underlying failure.
        source: Box<Error>,
    },

    /// Invalid configuration or override input.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// JSON parsing error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wraps this error with the field it occurred in.
    #[must_use]
    pub fn in_field(self, field: &str) -> Self {
        Self::Field {
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    /// Wraps this error with the collection position it occurred at.
    #[must_use]
    pub fn at_element(self, index: usize) -> Self {
        Self::Element {
            index,
            source: Box::new(self),
        }
    }

    /// Strips field and element wrappers, returning the underlying cause.
    pub fn root(&self) -> &Self {
        match self {
            Self::Field { source, .. } | Self::Element { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for population operations.
pub type Result<T> = std::result::Result<T, Error>;
