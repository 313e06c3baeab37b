//! Pipeline error types
//!
//! Rejections and transport failures travel as `Response` values. An
//! error here means the call produced no response at all.

use thiserror::Error;

/// Pipeline result type
pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request's cancellation token fired
    #[error("Request canceled")]
    Canceled,

    /// A stage or the transport failed without producing a response
    #[error("Internal pipeline error: {0}")]
    Internal(String),
}

impl PipelineError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Canceled => "PIPELINE_CANCELED",
            Self::Internal(_) => "PIPELINE_INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Canceled => 499,
            Self::Internal(_) => 500,
        }
    }
}
