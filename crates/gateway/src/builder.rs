use std::sync::Arc;
use std::time::Duration;

use blobvault_backend::ObjectBackend;

use crate::error::GatewayError;
use crate::gateway::BlobGateway;
use crate::retry::RetryPolicy;

/// Fluent builder for constructing a [`BlobGateway`].
///
/// A backend and a non-empty namespace root are required. The timeout
/// defaults to five seconds and retries are disabled.
pub struct GatewayBuilder {
    backend: Option<Arc<dyn ObjectBackend>>,
    namespace_root: Option<String>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl GatewayBuilder {
    /// Default per-call backend timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Create a builder with default timeout and no retries.
    pub fn new() -> Self {
        Self {
            backend: None,
            namespace_root: None,
            timeout: Self::DEFAULT_TIMEOUT,
            retry: RetryPolicy::disabled(),
        }
    }

    /// Set the object backend.
    #[must_use]
    pub fn backend(mut self, backend: Arc<dyn ObjectBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the namespace root (bucket) under which every key is derived.
    #[must_use]
    pub fn namespace_root(mut self, root: impl Into<String>) -> Self {
        self.namespace_root = Some(root.into());
        self
    }

    /// Set the per-call backend timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy for transient backend failures.
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Consume the builder and produce a [`BlobGateway`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the backend or namespace
    /// root is missing, or the timeout is zero.
    pub fn build(self) -> Result<BlobGateway, GatewayError> {
        let backend = self
            .backend
            .ok_or_else(|| GatewayError::Configuration("object backend is required".into()))?;

        let namespace_root = self
            .namespace_root
            .filter(|root| !root.is_empty())
            .ok_or_else(|| GatewayError::Configuration("namespace root is required".into()))?;

        if self.timeout.is_zero() {
            return Err(GatewayError::Configuration(
                "backend timeout must be greater than zero".into(),
            ));
        }

        Ok(BlobGateway::new(
            backend,
            namespace_root,
            self.timeout,
            self.retry,
        ))
    }
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
