//! Auth store error types.

use thiserror::Error;

/// Error type for auth store operations.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid email or password
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Invalid transition in the store lifecycle machine
    #[error("Invalid auth state transition: {0}")]
    InvalidStateTransition(String),

    /// Auth API error
    #[error("Auth API error: {0}")]
    Api(#[from] auth_api::ApiError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] storefront_storage::StorageError),

    /// Configuration or filesystem layout error
    #[error("Core error: {0}")]
    Core(#[from] storefront_core::CoreError),
}

impl AuthError {
    /// Returns true when the underlying failure is indeterminate (network,
    /// timeout, 5xx) rather than a definitive rejection.
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::Api(e) => e.is_indeterminate(),
            _ => false,
        }
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;
