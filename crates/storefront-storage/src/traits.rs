//! Storage trait definitions.

use crate::StorageResult;

/// Trait for client-side state storage backends.
pub trait StateStore: Send + Sync {
    /// Store a value under a key
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Retrieve a value
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Delete a value; returns whether the key existed
    fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Check if a key exists
    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
