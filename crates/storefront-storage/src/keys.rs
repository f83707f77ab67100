//! Storage key constants.

/// Storage keys used by the auth core.
pub struct StorageKeys;

impl StorageKeys {
    /// Persisted auth snapshot (JSON user projection).
    /// Matches the web storefront's localStorage key.
    pub const AUTH_SNAPSHOT: &'static str = "auth-storage";
}
