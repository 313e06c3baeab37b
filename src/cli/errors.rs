//! CLI error types
//!
//! Every failure is reported as `{"status": "error", "code", "message"}`
//! and mapped to an exit code per kind.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::filter::FilterError;

/// What went wrong, from the caller's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorKind {
    /// `--config` file unreadable or invalid
    Config,
    /// Input file or stdin unreadable, or stdout unwritable
    Io,
    /// The filter payload was rejected
    InvalidFilter,
}

impl CliErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config => "FILTER_CLI_CONFIG_ERROR",
            Self::Io => "FILTER_CLI_IO_ERROR",
            Self::InvalidFilter => "FILTER_CLI_INVALID_FILTER",
        }
    }

    /// Process exit code; a rejected filter is distinguishable from a broken setup
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidFilter => 1,
            Self::Io => 2,
            Self::Config => 3,
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    kind: CliErrorKind,
    message: String,
}

impl CliError {
    pub fn new(kind: CliErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(CliErrorKind::Io, message)
    }

    pub fn kind(&self) -> CliErrorKind {
        self.kind
    }

    pub fn code_str(&self) -> &'static str {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(CliErrorKind::Config, e.to_string())
    }
}

// The filter's own code is kept in the message so scripts can tell
// a malformed payload from a validation failure.
impl From<FilterError> for CliError {
    fn from(e: FilterError) -> Self {
        Self::new(CliErrorKind::InvalidFilter, format!("[{}] {}", e.code(), e))
    }
}

/// Only raised while writing output; payload parse errors arrive as `FilterError`
impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io(format!("cannot write JSON output: {}", e))
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ValidationDetails;

    #[test]
    fn test_filter_error_conversion() {
        let err: CliError = FilterError::from(ValidationDetails::missing_field("$.value")).into();
        assert_eq!(err.kind(), CliErrorKind::InvalidFilter);
        assert_eq!(err.code_str(), "FILTER_CLI_INVALID_FILTER");
        assert!(err.message().starts_with("[FILTER_VALIDATION_FAILED]"));
        assert!(err.to_string().starts_with("FILTER_CLI_INVALID_FILTER: "));
    }

    #[test]
    fn test_exit_codes_differ_by_kind() {
        assert_eq!(CliError::io("gone").exit_code(), 2);
        let config: CliError = ConfigError::Invalid("max_entries must be positive".into()).into();
        assert_eq!(config.exit_code(), 3);
        assert_eq!(config.kind(), CliErrorKind::Config);
    }
}
