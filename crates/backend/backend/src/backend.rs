use async_trait::async_trait;
use bytes::Bytes;

use blobvault_core::StorageKey;

use crate::error::BackendError;

/// Key/value object store holding serialized blob envelopes.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
/// Every object is transferred as a single in-memory buffer.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Short backend name used in logs (e.g. `"memory"`, `"s3"`).
    fn name(&self) -> &str;

    /// Read the object stored at `key`.
    ///
    /// Returns [`BackendError::NotFound`] if no object exists there.
    async fn get(&self, key: &StorageKey) -> Result<Bytes, BackendError>;

    /// Write `bytes` at `key`, overwriting any existing object.
    async fn put(&self, key: &StorageKey, bytes: Bytes) -> Result<(), BackendError>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> Result<(), BackendError> {
        Ok(())
    }
}
