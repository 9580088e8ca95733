//! Error types for backend service communication.

use thiserror::Error;

/// Result type alias for backend client operations.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Errors that can occur while talking to a backend service.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level failure (connection refused, DNS, timeout, decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status code.
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The configured base URL could not be parsed.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The service answered 2xx but the payload failed the success flag.
    #[error("Service reported failure: {0}")]
    ServiceFailure(String),
}

impl BackendError {
    /// Create a status error from a response status and body.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Create a service failure error with the service's own message.
    pub fn service_failure(message: impl Into<String>) -> Self {
        Self::ServiceFailure(message.into())
    }

    /// True when the failure is plausibly transient (worth a user retry).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => matches!(status, 429 | 500 | 502 | 503),
            _ => false,
        }
    }
}
