//! Filter error types
//!
//! Error codes:
//! - FILTER_VALIDATION_FAILED (REJECT)
//! - FILTER_MALFORMED_PAYLOAD (REJECT)
//! - FILTER_TRANSLATION_FAILED (FATAL for the translation attempt)
//! - FILTER_REHYDRATION_FAILED (REJECT)
//! - FILTER_CANCELED

use std::fmt;

use thiserror::Error;

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Validation failure details
///
/// Exactly one is reported per rejected payload: the first offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// JSON path of the field (e.g., "$.children[1].property")
    pub field: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl ValidationDetails {
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(field, "field to be present", "missing")
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(field, expected, actual)
    }

    pub fn unknown_operator(field: impl Into<String>, operator: &str) -> Self {
        Self::new(field, "a known operator", format!("'{}'", operator))
    }

    pub fn empty_group(field: impl Into<String>) -> Self {
        Self::new(field, "at least one child", "empty array")
    }

    pub fn empty_property(field: impl Into<String>) -> Self {
        Self::new(field, "non-empty member path", "empty string")
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field '{}': expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Filter errors
#[derive(Debug, Error)]
pub enum FilterError {
    /// Malformed wire payload (unknown operator, missing property, empty group, wrong type)
    #[error("Invalid filter: {0}")]
    Validation(ValidationDetails),

    /// Payload is not parseable JSON or does not fit the wire shape
    #[error("Malformed filter payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Predicate expression shape has no filter tree equivalent
    #[error("Unsupported predicate: {0}")]
    Translation(String),

    /// Tree does not fit the target type
    #[error("Cannot apply filter on '{path}': {reason}")]
    Rehydration { path: String, reason: String },

    /// Evaluation was canceled
    #[error("Filter evaluation canceled")]
    Canceled,
}

impl FilterError {
    pub fn translation(msg: impl Into<String>) -> Self {
        Self::Translation(msg.into())
    }

    pub fn rehydration(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rehydration {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "FILTER_VALIDATION_FAILED",
            Self::Serialization(_) => "FILTER_MALFORMED_PAYLOAD",
            Self::Translation(_) => "FILTER_TRANSLATION_FAILED",
            Self::Rehydration { .. } => "FILTER_REHYDRATION_FAILED",
            Self::Canceled => "FILTER_CANCELED",
        }
    }

    /// Get HTTP status code for a rejected request
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Serialization(_) | Self::Rehydration { .. } => 400,
            Self::Translation(_) => 500,
            Self::Canceled => 499,
        }
    }

    /// Validation details if this is a validation failure
    pub fn details(&self) -> Option<&ValidationDetails> {
        match self {
            Self::Validation(details) => Some(details),
            _ => None,
        }
    }
}

impl From<ValidationDetails> for FilterError {
    fn from(details: ValidationDetails) -> Self {
        Self::Validation(details)
    }
}
