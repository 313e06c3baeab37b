//! Response envelope

use serde::{Deserialize, Serialize};

/// Outcome of a pipeline call
///
/// Serializable so the caching interceptor can store it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl<T> Response<T> {
    /// Successful response carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            status: Some(200),
        }
    }

    /// Successful response without a payload
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            status: Some(204),
        }
    }

    /// Failed response from the transport or the remote side
    pub fn failure(error: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            status,
        }
    }

    /// Request refused by a stage before reaching the transport
    pub fn rejected(status: u16, error: impl Into<String>) -> Self {
        Self::failure(error, Some(status))
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            status: self.status,
        }
    }
}
