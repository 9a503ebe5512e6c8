use bytes::Bytes;

use blobvault_core::{BlobId, Profile, StorageKey};

use crate::backend::ObjectBackend;
use crate::error::BackendError;

fn test_key(login: &str, id: BlobId) -> StorageKey {
    StorageKey::derive("conformance", &Profile::new(login), id)
}

/// Run the full object backend conformance test suite.
///
/// Call this from your backend's test module with a fresh backend instance.
///
/// # Errors
///
/// Returns an error if a backend operation fails unexpectedly.
pub async fn run_backend_conformance_tests(backend: &dyn ObjectBackend) -> Result<(), BackendError> {
    test_get_missing(backend).await?;
    test_put_and_get(backend).await?;
    test_overwrite(backend).await?;
    test_identity_isolation(backend).await?;
    test_empty_object(backend).await?;
    Ok(())
}

async fn test_get_missing(backend: &dyn ObjectBackend) -> Result<(), BackendError> {
    let key = test_key("alice", BlobId::generate());
    let result = backend.get(&key).await;
    assert!(
        matches!(result, Err(BackendError::NotFound(_))),
        "get on missing key should return NotFound, got {result:?}"
    );
    Ok(())
}

async fn test_put_and_get(backend: &dyn ObjectBackend) -> Result<(), BackendError> {
    let key = test_key("alice", BlobId::generate());
    backend.put(&key, Bytes::from_static(b"hello")).await?;
    let value = backend.get(&key).await?;
    assert_eq!(value.as_ref(), b"hello");
    Ok(())
}

async fn test_overwrite(backend: &dyn ObjectBackend) -> Result<(), BackendError> {
    let key = test_key("alice", BlobId::generate());
    backend.put(&key, Bytes::from_static(b"v1")).await?;
    backend.put(&key, Bytes::from_static(b"v2")).await?;
    let value = backend.get(&key).await?;
    assert_eq!(value.as_ref(), b"v2", "put should overwrite");
    Ok(())
}

async fn test_identity_isolation(backend: &dyn ObjectBackend) -> Result<(), BackendError> {
    let id = BlobId::generate();
    let alice = test_key("alice", id);
    let bob = test_key("bob", id);
    backend.put(&alice, Bytes::from_static(b"alice-data")).await?;
    let result = backend.get(&bob).await;
    assert!(
        matches!(result, Err(BackendError::NotFound(_))),
        "same blob id under another login must not resolve, got {result:?}"
    );
    Ok(())
}

async fn test_empty_object(backend: &dyn ObjectBackend) -> Result<(), BackendError> {
    let key = test_key("alice", BlobId::generate());
    backend.put(&key, Bytes::new()).await?;
    let value = backend.get(&key).await?;
    assert!(value.is_empty());
    Ok(())
}
