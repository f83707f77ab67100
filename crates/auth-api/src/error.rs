//! Auth API error types.

use thiserror::Error;

/// Error type for calls to the external auth API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level HTTP error (connection refused, timeout, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the request (4xx)
    #[error("Request rejected: HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The API failed server-side (5xx)
    #[error("Server error: HTTP {status}: {message}")]
    Server { status: u16, message: String },
}

impl ApiError {
    /// Returns true when the failure is indeterminate — the call failed but
    /// proves nothing about session validity (transport failures, timeouts,
    /// 5xx). The store's fail-open policy hinges on this distinction: an
    /// indeterminate failure must never clear a previously trusted identity.
    pub fn is_indeterminate(&self) -> bool {
        match self {
            ApiError::Http(_) => true,
            ApiError::Server { .. } => true,
            ApiError::Rejected { .. } => false,
        }
    }

    /// Returns true for an explicit 401 rejection.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Rejected { status: 401, .. })
    }
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;
