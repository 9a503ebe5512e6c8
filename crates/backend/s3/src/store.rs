use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{debug, instrument};

use blobvault_backend::{BackendError, ObjectBackend};
use blobvault_core::StorageKey;

use crate::auth::build_sdk_config;
use crate::config::S3Config;
use crate::error::classify_sdk_error;

/// Content type recorded on every stored object. Objects hold envelopes,
/// never raw payloads.
const ENVELOPE_CONTENT_TYPE: &str = "application/json";

/// Object backend backed by AWS S3 or an S3-compatible service.
pub struct S3Backend {
    client: aws_sdk_s3::Client,
    operation_timeout: Duration,
}

impl std::fmt::Debug for S3Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Backend")
            .field("operation_timeout", &self.operation_timeout)
            .finish_non_exhaustive()
    }
}

impl S3Backend {
    /// Create a backend by resolving credentials from the environment.
    pub async fn new(config: &S3Config) -> Self {
        let sdk_config = build_sdk_config(config).await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();
        Self::with_client(aws_sdk_s3::Client::from_conf(s3_config), config.operation_timeout())
    }

    /// Create a backend around a pre-built client.
    pub fn with_client(client: aws_sdk_s3::Client, operation_timeout: Duration) -> Self {
        Self {
            client,
            operation_timeout,
        }
    }

    fn classify<E, R>(&self, err: &SdkError<E, R>) -> BackendError
    where
        E: std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        classify_sdk_error(
            &DisplayErrorContext(err).to_string(),
            self.operation_timeout,
        )
    }
}

/// Whether a failed `GetObject` means the object does not exist.
///
/// Some S3-compatible servers answer a missing key with a bare 404 that the
/// SDK cannot parse into `NoSuchKey`, so the raw status counts too.
fn is_missing(err: &SdkError<GetObjectError, HttpResponse>) -> bool {
    missing_object(
        err.as_service_error()
            .is_some_and(GetObjectError::is_no_such_key),
        err.raw_response().map(|r| r.status().as_u16()),
    )
}

fn missing_object(no_such_key: bool, status: Option<u16>) -> bool {
    no_such_key || status == Some(404)
}

#[async_trait]
impl ObjectBackend for S3Backend {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "s3"
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &StorageKey) -> Result<Bytes, BackendError> {
        let output = self
            .client
            .get_object()
            .bucket(key.namespace_root())
            .key(key.object_path())
            .send()
            .await
            .map_err(|e| {
                if is_missing(&e) {
                    BackendError::NotFound(key.canonical())
                } else {
                    self.classify(&e)
                }
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| BackendError::Unavailable(format!("failed to read object body: {e}")))?
            .into_bytes();

        debug!(len = body.len(), "fetched object");
        Ok(body)
    }

    #[instrument(skip(self, bytes), fields(key = %key, len = bytes.len()))]
    async fn put(&self, key: &StorageKey, bytes: Bytes) -> Result<(), BackendError> {
        self.client
            .put_object()
            .bucket(key.namespace_root())
            .key(key.object_path())
            .content_type(ENVELOPE_CONTENT_TYPE)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        debug!("stored object");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        self.client
            .list_buckets()
            .send()
            .await
            .map_err(|e| self.classify(&e))?;
        Ok(())
    }
}


#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use blobvault_backend::testing::run_backend_conformance_tests;

    use super::*;

    // Requires an S3-compatible server with a `conformance` bucket, e.g.
    // MinIO at `S3_ENDPOINT_URL` (default http://localhost:9000).
    #[tokio::test]
    async fn s3_conformance() {
        let endpoint = std::env::var("S3_ENDPOINT_URL")
            .unwrap_or_else(|_| "http://localhost:9000".to_owned());
        let config = S3Config::new("us-east-1")
            .with_endpoint_url(endpoint)
            .with_force_path_style(true);
        let backend = S3Backend::new(&config).await;
        run_backend_conformance_tests(&backend).await.unwrap();
    }
}
