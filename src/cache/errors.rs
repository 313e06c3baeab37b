//! Cache error types

use thiserror::Error;

/// Result type for cache store operations
pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cache operation failed: {0}")]
    Operation(String),
}

impl CacheError {
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Get error code for logs and API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Serialization(_) => "CACHE_SERIALIZATION_FAILED",
            Self::Operation(_) => "CACHE_OPERATION_FAILED",
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CacheError::operation("store offline");
        assert_eq!(err.to_string(), "Cache operation failed: store offline");
        assert_eq!(err.code(), "CACHE_OPERATION_FAILED");
    }

    #[test]
    fn test_from_serde() {
        let err: CacheError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, CacheError::Serialization(_)));
    }
}
