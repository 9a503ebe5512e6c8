use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, instrument, warn};

use blobvault_backend::{BackendError, ObjectBackend};
use blobvault_core::{Blob, BlobId, Profile, StorageKey, decode_envelope, serialize_envelope};

use crate::error::GatewayError;
use crate::retry::RetryPolicy;

/// Stores and retrieves blobs under the caller's own namespace.
///
/// Every key is derived from the verified [`Profile`] and a server-generated
/// [`BlobId`], so there is no request input that can address another
/// identity's objects. Holds no mutable state; share it behind an `Arc`.
pub struct BlobGateway {
    backend: Arc<dyn ObjectBackend>,
    namespace_root: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl std::fmt::Debug for BlobGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobGateway")
            .field("backend", &self.backend.name())
            .field("namespace_root", &self.namespace_root)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl BlobGateway {
    pub(crate) fn new(
        backend: Arc<dyn ObjectBackend>,
        namespace_root: String,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            backend,
            namespace_root,
            timeout,
            retry,
        }
    }

    /// Name of the configured backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Namespace root every key is derived under.
    pub fn namespace_root(&self) -> &str {
        &self.namespace_root
    }

    /// The key `id` resolves to for `profile`.
    pub fn derive_key(&self, profile: &Profile, id: BlobId) -> StorageKey {
        StorageKey::derive(&self.namespace_root, profile, id)
    }

    /// Persist `blob` under a fresh id in `profile`'s namespace.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EncodeFailed`] if the envelope cannot be built
    /// and [`GatewayError::BackendUnavailable`] if the write fails.
    #[instrument(skip_all, fields(login = %profile.login, mime_type = blob.mime_type(), len = blob.len()))]
    pub async fn store(&self, profile: &Profile, blob: &Blob) -> Result<BlobId, GatewayError> {
        let bytes = Bytes::from(
            serialize_envelope(blob).map_err(|e| GatewayError::EncodeFailed(e.to_string()))?,
        );
        let id = BlobId::generate();
        let key = self.derive_key(profile, id);

        // Same key and bytes on every attempt, so a retried put is idempotent.
        self.call("put", &key, || self.backend.put(&key, bytes.clone()))
            .await?;

        info!(blob_id = %id, "blob stored");
        Ok(id)
    }

    /// Load blob `id` from `profile`'s namespace.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if nothing is stored at the key,
    /// [`GatewayError::DecodeFailed`] if the stored bytes are not an envelope,
    /// and [`GatewayError::BackendUnavailable`] if the read fails.
    #[instrument(skip_all, fields(login = %profile.login, blob_id = %id))]
    pub async fn retrieve(&self, profile: &Profile, id: BlobId) -> Result<Blob, GatewayError> {
        let key = self.derive_key(profile, id);
        let bytes = self.call("get", &key, || self.backend.get(&key)).await?;

        let blob = decode_envelope(&bytes).map_err(|e| {
            warn!(key = %key, error = %e, "stored object is not a valid envelope");
            GatewayError::DecodeFailed(e.to_string())
        })?;

        debug!(mime_type = blob.mime_type(), len = blob.len(), "blob retrieved");
        Ok(blob)
    }

    /// Check the backend once, bounded by the call timeout. Never retried.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::BackendUnavailable`] if the check fails or
    /// does not finish in time.
    #[instrument(skip_all, fields(backend = self.backend.name()))]
    pub async fn health_check(&self) -> Result<(), GatewayError> {
        let outcome = tokio::time::timeout(self.timeout, self.backend.health_check())
            .await
            .unwrap_or(Err(BackendError::Timeout(self.timeout)));
        outcome.map_err(|e| {
            warn!(error = %e, "backend health check failed");
            GatewayError::BackendUnavailable(e.to_string())
        })
    }

    /// Run one backend operation under the timeout, retrying transient
    /// failures according to the retry policy.
    async fn call<T, F, Fut>(
        &self,
        op: &'static str,
        key: &StorageKey,
        mut f: F,
    ) -> Result<T, GatewayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let mut attempt = 0u32;
        loop {
            let err = match tokio::time::timeout(self.timeout, f()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(BackendError::NotFound(_))) => return Err(GatewayError::NotFound),
                Ok(Err(e)) => e,
                Err(_) => BackendError::Timeout(self.timeout),
            };

            if attempt >= self.retry.max_retries || !err.is_transient() {
                warn!(
                    op,
                    key = %key,
                    backend = self.backend.name(),
                    attempts = attempt + 1,
                    error = %err,
                    "backend operation failed"
                );
                return Err(GatewayError::BackendUnavailable(err.to_string()));
            }

            let delay = self.retry.delay_for(attempt);
            warn!(
                op,
                key = %key,
                attempt = attempt + 1,
                max_retries = self.retry.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "transient backend failure, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use blobvault_backend_memory::MemoryBackend;

    use super::*;
    use crate::builder::GatewayBuilder;

    fn alice() -> Profile {
        Profile::new("alice")
    }

    fn bob() -> Profile {
        Profile::new("bob")
    }

    fn gateway_with(backend: Arc<dyn ObjectBackend>) -> BlobGateway {
        GatewayBuilder::new()
            .backend(backend)
            .namespace_root("blobs")
            .build()
            .unwrap()
    }

    /// Backend whose calls never complete within any sane timeout.
    struct SlowBackend;

    #[async_trait]
    impl ObjectBackend for SlowBackend {
        #[allow(clippy::unnecessary_literal_bound)]
        fn name(&self) -> &str {
            "slow"
        }

        async fn get(&self, _key: &StorageKey) -> Result<Bytes, BackendError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Bytes::new())
        }

        async fn put(&self, _key: &StorageKey, _bytes: Bytes) -> Result<(), BackendError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }

        async fn health_check(&self) -> Result<(), BackendError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    /// Backend that fails the first `failures` calls, then delegates to memory.
    struct FlakyBackend {
        inner: MemoryBackend,
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyBackend {
        fn new(failures: u32) -> Self {
            Self {
                inner: MemoryBackend::new(),
                failures,
                calls: AtomicU32::new(0),
            }
        }

        fn trip(&self) -> Result<(), BackendError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(BackendError::Unavailable("connection reset".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ObjectBackend for FlakyBackend {
        #[allow(clippy::unnecessary_literal_bound)]
        fn name(&self) -> &str {
            "flaky"
        }

        async fn get(&self, key: &StorageKey) -> Result<Bytes, BackendError> {
            self.trip()?;
            self.inner.get(key).await
        }

        async fn put(&self, key: &StorageKey, bytes: Bytes) -> Result<(), BackendError> {
            self.trip()?;
            self.inner.put(key, bytes).await
        }

        async fn health_check(&self) -> Result<(), BackendError> {
            self.trip()
        }
    }

    #[tokio::test]
    async fn store_then_retrieve_round_trip() {
        let gateway = gateway_with(Arc::new(MemoryBackend::new()));
        let blob = Blob::new("text/plain", b"hello".to_vec());

        let id = gateway.store(&alice(), &blob).await.unwrap();
        let fetched = gateway.retrieve(&alice(), id).await.unwrap();
        assert_eq!(fetched, blob);
    }

    #[tokio::test]
    async fn store_writes_under_callers_namespace() {
        let backend = Arc::new(MemoryBackend::new());
        let gateway = gateway_with(backend.clone());

        let id = gateway
            .store(&alice(), &Blob::new("text/plain", b"x".to_vec()))
            .await
            .unwrap();

        let key = gateway.derive_key(&alice(), id);
        assert_eq!(key.to_string(), format!("blobs/alice/{id}"));
        assert!(backend.contains(&key));
        assert!(!backend.contains(&gateway.derive_key(&bob(), id)));
    }

    #[tokio::test]
    async fn each_store_gets_a_fresh_id() {
        let gateway = gateway_with(Arc::new(MemoryBackend::new()));
        let blob = Blob::new("text/plain", b"same".to_vec());

        let a = gateway.store(&alice(), &blob).await.unwrap();
        let b = gateway.store(&alice(), &blob).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn other_identity_cannot_retrieve() {
        let gateway = gateway_with(Arc::new(MemoryBackend::new()));
        let id = gateway
            .store(&alice(), &Blob::new("text/plain", b"secret".to_vec()))
            .await
            .unwrap();

        assert_eq!(
            gateway.retrieve(&bob(), id).await,
            Err(GatewayError::NotFound)
        );
    }

    #[tokio::test]
    async fn retrieve_unknown_id_is_not_found() {
        let gateway = gateway_with(Arc::new(MemoryBackend::new()));
        assert_eq!(
            gateway.retrieve(&alice(), BlobId::generate()).await,
            Err(GatewayError::NotFound)
        );
    }

    #[tokio::test]
    async fn corrupt_object_is_decode_failure() {
        let backend = Arc::new(MemoryBackend::new());
        let gateway = gateway_with(backend.clone());
        let id = BlobId::generate();
        backend
            .put(&gateway.derive_key(&alice(), id), Bytes::from_static(b"{\"mimeType\":"))
            .await
            .unwrap();

        assert!(matches!(
            gateway.retrieve(&alice(), id).await,
            Err(GatewayError::DecodeFailed(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_times_out() {
        let gateway = GatewayBuilder::new()
            .backend(Arc::new(SlowBackend))
            .namespace_root("blobs")
            .timeout(Duration::from_millis(250))
            .build()
            .unwrap();

        let err = gateway
            .store(&alice(), &Blob::new("text/plain", b"x".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::BackendUnavailable(msg) if msg.contains("timed out")));

        let err = gateway.retrieve(&alice(), BlobId::generate()).await.unwrap_err();
        assert!(matches!(err, GatewayError::BackendUnavailable(_)));
    }

    #[tokio::test]
    async fn healthy_backend_passes_health_check() {
        let gateway = gateway_with(Arc::new(MemoryBackend::new()));
        assert_eq!(gateway.health_check().await, Ok(()));
    }

    #[tokio::test]
    async fn health_check_reports_unavailable_backend() {
        let gateway = GatewayBuilder::new()
            .backend(Arc::new(FlakyBackend::new(1)))
            .namespace_root("blobs")
            .retry(RetryPolicy::exponential(3, Duration::from_millis(10)))
            .build()
            .unwrap();

        // Health checks are not retried even when a retry policy is configured.
        assert!(matches!(
            gateway.health_check().await,
            Err(GatewayError::BackendUnavailable(msg)) if msg.contains("connection reset")
        ));
        assert_eq!(gateway.health_check().await, Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_health_check_times_out() {
        let gateway = GatewayBuilder::new()
            .backend(Arc::new(SlowBackend))
            .namespace_root("blobs")
            .timeout(Duration::from_millis(250))
            .build()
            .unwrap();

        assert!(matches!(
            gateway.health_check().await,
            Err(GatewayError::BackendUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn failures_surface_immediately_without_retry() {
        let backend = Arc::new(FlakyBackend::new(1));
        let gateway = gateway_with(backend.clone());

        let err = gateway
            .store(&alice(), &Blob::new("text/plain", b"x".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::BackendUnavailable(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert!(backend.inner.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried() {
        let backend = Arc::new(FlakyBackend::new(2));
        let gateway = GatewayBuilder::new()
            .backend(backend.clone())
            .namespace_root("blobs")
            .retry(RetryPolicy::exponential(3, Duration::from_millis(100)))
            .build()
            .unwrap();

        let blob = Blob::new("image/png", vec![0x89, b'P', b'N', b'G']);
        let id = gateway.store(&alice(), &blob).await.unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
        assert_eq!(gateway.retrieve(&alice(), id).await.unwrap(), blob);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_are_bounded() {
        let backend = Arc::new(FlakyBackend::new(u32::MAX));
        let gateway = GatewayBuilder::new()
            .backend(backend.clone())
            .namespace_root("blobs")
            .retry(RetryPolicy::exponential(2, Duration::from_millis(10)))
            .build()
            .unwrap();

        let err = gateway.retrieve(&alice(), BlobId::generate()).await.unwrap_err();
        assert!(matches!(err, GatewayError::BackendUnavailable(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn not_found_is_never_retried() {
        let backend = Arc::new(FlakyBackend::new(0));
        let gateway = GatewayBuilder::new()
            .backend(backend.clone())
            .namespace_root("blobs")
            .retry(RetryPolicy::exponential(5, Duration::from_millis(1)))
            .build()
            .unwrap();

        assert_eq!(
            gateway.retrieve(&alice(), BlobId::generate()).await,
            Err(GatewayError::NotFound)
        );
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn builder_requires_backend() {
        let err = GatewayBuilder::new().namespace_root("blobs").build().unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(msg) if msg.contains("backend")));
    }

    #[test]
    fn builder_rejects_empty_namespace_root() {
        let err = GatewayBuilder::new()
            .backend(Arc::new(MemoryBackend::new()))
            .namespace_root("")
            .build()
            .unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(msg) if msg.contains("namespace")));
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        let err = GatewayBuilder::new()
            .backend(Arc::new(MemoryBackend::new()))
            .namespace_root("blobs")
            .timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[test]
    fn debug_names_backend() {
        let gateway = gateway_with(Arc::new(MemoryBackend::new()));
        assert_eq!(gateway.backend_name(), "memory");
        assert!(format!("{gateway:?}").contains("memory"));
    }
}
