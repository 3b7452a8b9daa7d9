//! Error types for model service calls.

use thiserror::Error;

/// Errors that can occur when talking to a model service.
#[derive(Error, Debug)]
pub enum LlmError {
    /// The service could not be reached at all.
    #[error("Model server is not reachable at {host}")]
    ServerNotRunning { host: String },

    /// Request timeout.
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// The requested model is not available.
    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The service answered without any text.
    #[error("Model returned no text")]
    EmptyResponse,

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Whether the failure means the service could not be contacted.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, LlmError::ServerNotRunning { .. })
    }
}

/// Result type for model service operations.
pub type LlmResult<T> = Result<T, LlmError>;

/// Map a transport failure to the matching error kind.
pub(crate) fn map_send_error(error: reqwest::Error, host: &str, timeout_secs: u64) -> LlmError {
    if error.is_connect() {
        LlmError::ServerNotRunning {
            host: host.to_string(),
        }
    } else if error.is_timeout() {
        LlmError::Timeout {
            seconds: timeout_secs,
        }
    } else {
        LlmError::Http(error)
    }
}
