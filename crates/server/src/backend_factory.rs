use std::sync::Arc;

use tracing::info;

use blobvault_backend::ObjectBackend;
use blobvault_backend_memory::MemoryBackend;
use blobvault_backend_s3::S3Backend;
use blobvault_gateway::{BlobGateway, GatewayBuilder, GatewayError};

use crate::config::StorageConfig;
use crate::error::ServerError;

/// Construct the object backend named by `config.backend`.
pub async fn create_backend(config: &StorageConfig) -> Result<Arc<dyn ObjectBackend>, ServerError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryBackend::new())),
        "s3" => {
            let s3 = config.s3_config();
            info!(region = %s3.region, endpoint = ?s3.endpoint_url, "using S3 backend");
            Ok(Arc::new(S3Backend::new(&s3).await))
        }
        other => Err(ServerError::Config(format!(
            "unsupported storage backend: {other}"
        ))),
    }
}

/// Wrap `backend` in a gateway configured from `config`.
pub fn create_gateway(
    backend: Arc<dyn ObjectBackend>,
    config: &StorageConfig,
) -> Result<BlobGateway, ServerError> {
    GatewayBuilder::new()
        .backend(backend)
        .namespace_root(config.namespace_root.clone())
        .timeout(config.timeout())
        .retry(config.retry_policy())
        .build()
        .map_err(|e| match e {
            GatewayError::Configuration(msg) => ServerError::Config(msg),
            other => ServerError::Gateway(other),
        })
}
