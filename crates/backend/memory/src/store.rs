use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

use blobvault_backend::{BackendError, ObjectBackend};
use blobvault_core::StorageKey;

/// In-memory [`ObjectBackend`] backed by a [`DashMap`].
///
/// Objects are keyed by the canonical storage key string. Nothing is
/// persisted across restarts.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    objects: DashMap<String, Bytes>,
}

impl MemoryBackend {
    /// Create a new, empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if no object has been stored.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns `true` if an object exists at `key`.
    pub fn contains(&self, key: &StorageKey) -> bool {
        self.objects.contains_key(&key.canonical())
    }
}

#[async_trait]
impl ObjectBackend for MemoryBackend {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &StorageKey) -> Result<Bytes, BackendError> {
        let rendered = key.canonical();
        match self.objects.get(&rendered) {
            Some(entry) => Ok(entry.value().clone()),
            None => Err(BackendError::NotFound(rendered)),
        }
    }

    async fn put(&self, key: &StorageKey, bytes: Bytes) -> Result<(), BackendError> {
        let rendered = key.canonical();
        debug!(key = %rendered, size = bytes.len(), "storing object in memory");
        self.objects.insert(rendered, bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use blobvault_core::{BlobId, Profile};

    use super::*;

    #[tokio::test]
    async fn conformance() {
        let backend = MemoryBackend::new();
        blobvault_backend::testing::run_backend_conformance_tests(&backend)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn len_and_contains_track_puts() {
        let backend = MemoryBackend::new();
        assert!(backend.is_empty());

        let key = StorageKey::derive("blobs", &Profile::new("alice"), BlobId::generate());
        assert!(!backend.contains(&key));

        backend.put(&key, Bytes::from_static(b"x")).await.unwrap();
        assert_eq!(backend.len(), 1);
        assert!(backend.contains(&key));
    }

    #[tokio::test]
    async fn not_found_carries_rendered_key() {
        let backend = MemoryBackend::new();
        let key = StorageKey::derive("blobs", &Profile::new("bob"), BlobId::generate());
        let err = backend.get(&key).await.unwrap_err();
        assert_eq!(err, BackendError::NotFound(key.canonical()));
    }

    #[test]
    fn backend_name() {
        assert_eq!(MemoryBackend::new().name(), "memory");
    }
}
