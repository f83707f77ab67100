//! High-level API for the persisted identity snapshot.

use crate::{StateStore, StorageKeys, StorageResult};
use serde::{Deserialize, Serialize};
use session_token::Role;

/// Persistence shape of the identity snapshot.
///
/// Only the user projection is cached — never tokens. The snapshot exists so
/// a reloaded client can paint optimistically while re-validation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredIdentity {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    /// ISO timestamp from the auth API.
    pub created_at: String,
}

/// Typed wrapper over a [`StateStore`] for the auth snapshot.
pub struct ProfileCache {
    storage: Box<dyn StateStore>,
}

impl ProfileCache {
    /// Create a new cache over the given storage backend.
    pub fn new(storage: Box<dyn StateStore>) -> Self {
        Self { storage }
    }

    /// Persist the identity snapshot.
    pub fn set_identity(&self, identity: &StoredIdentity) -> StorageResult<()> {
        let json = serde_json::to_string(identity)
            .map_err(|e| crate::StorageError::Encoding(e.to_string()))?;
        self.storage.set(StorageKeys::AUTH_SNAPSHOT, &json)
    }

    /// Load the identity snapshot, if one was persisted.
    ///
    /// An unreadable snapshot is treated as absent (and logged), not as an
    /// error: the client re-validates against the server anyway.
    pub fn get_identity(&self) -> StorageResult<Option<StoredIdentity>> {
        let raw = match self.storage.get(StorageKeys::AUTH_SNAPSHOT)? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        match serde_json::from_str(&raw) {
            Ok(identity) => Ok(Some(identity)),
            Err(e) => {
                tracing::warn!("Discarding unreadable auth snapshot: {}", e);
                let _ = self.storage.delete(StorageKeys::AUTH_SNAPSHOT);
                Ok(None)
            }
        }
    }

    /// Remove the identity snapshot.
    pub fn clear_identity(&self) -> StorageResult<()> {
        self.storage.delete(StorageKeys::AUTH_SNAPSHOT)?;
        Ok(())
    }

    /// Whether a snapshot is present.
    pub fn has_identity(&self) -> StorageResult<bool> {
        self.storage.has(StorageKeys::AUTH_SNAPSHOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn sample_identity() -> StoredIdentity {
        StoredIdentity {
            id: "user-123".to_string(),
            name: Some("Ada".to_string()),
            email: "ada@example.com".to_string(),
            role: Role::User,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_set_get_clear() {
        let cache = ProfileCache::new(Box::new(MemoryStore::new()));

        assert!(cache.get_identity().unwrap().is_none());
        assert!(!cache.has_identity().unwrap());

        cache.set_identity(&sample_identity()).unwrap();
        assert!(cache.has_identity().unwrap());
        assert_eq!(cache.get_identity().unwrap(), Some(sample_identity()));

        cache.clear_identity().unwrap();
        assert!(cache.get_identity().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_snapshot_is_discarded() {
        let store = MemoryStore::new();
        store.set(StorageKeys::AUTH_SNAPSHOT, "{broken").unwrap();

        let cache = ProfileCache::new(Box::new(store));
        assert!(cache.get_identity().unwrap().is_none());
        // The corrupt entry was dropped, not left to fail again.
        assert!(!cache.has_identity().unwrap());
    }

    #[test]
    fn test_nullable_name_roundtrip() {
        let cache = ProfileCache::new(Box::new(MemoryStore::new()));
        let mut identity = sample_identity();
        identity.name = None;

        cache.set_identity(&identity).unwrap();
        assert_eq!(cache.get_identity().unwrap().unwrap().name, None);
    }
}
