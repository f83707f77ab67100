//! Client-side state persistence for the storefront.
//!
//! This crate models the browser's localStorage: a small string key/value
//! store holding the persisted auth snapshot (the user projection only —
//! tokens never touch this store; they live in httponly cookies owned by the
//! auth API). Two backends are provided:
//! - **memory**: ephemeral, used in tests and private-browsing-like contexts
//! - **file**: a JSON file on disk, for fast optimistic paint on reload

mod file;
mod keys;
mod memory;
mod profile_cache;
mod traits;

pub use file::FileStore;
pub use keys::StorageKeys;
pub use memory::MemoryStore;
pub use profile_cache::{ProfileCache, StoredIdentity};
pub use traits::StateStore;

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific storage error
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
