use std::time::Duration;

use serde::Deserialize;

use blobvault_backend_s3::S3Config;
use blobvault_gateway::RetryPolicy;

/// Object backend and gateway settings.
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Which backend to use: `"memory"` or `"s3"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Bucket (namespace root) holding every identity's prefix.
    #[serde(default = "default_namespace_root")]
    pub namespace_root: String,
    /// Per-call backend timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries after a transient backend failure. `0` disables retrying.
    #[serde(default)]
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds. Doubles per attempt.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
    /// AWS region for the S3 backend.
    #[serde(default = "default_region")]
    pub region: String,
    /// Endpoint override for S3-compatible services.
    pub endpoint_url: Option<String>,
    /// Use path-style bucket addressing.
    #[serde(default)]
    pub force_path_style: bool,
    /// Optional IAM role to assume for S3 access.
    pub role_arn: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            namespace_root: default_namespace_root(),
            timeout_ms: default_timeout_ms(),
            max_retries: 0,
            retry_base_ms: default_retry_base_ms(),
            region: default_region(),
            endpoint_url: None,
            force_path_style: false,
            role_arn: None,
        }
    }
}

impl StorageConfig {
    /// Gateway timeout for a single backend call.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Retry policy derived from `max_retries` and `retry_base_ms`.
    pub fn retry_policy(&self) -> RetryPolicy {
        if self.max_retries == 0 {
            RetryPolicy::disabled()
        } else {
            RetryPolicy::exponential(self.max_retries, Duration::from_millis(self.retry_base_ms))
        }
    }

    /// Settings for the S3 backend. The SDK timeout matches the gateway's.
    pub fn s3_config(&self) -> S3Config {
        let mut config = S3Config::new(self.region.clone())
            .with_force_path_style(self.force_path_style)
            .with_operation_timeout(self.timeout());
        if let Some(endpoint) = &self.endpoint_url {
            config = config.with_endpoint_url(endpoint.clone());
        }
        if let Some(role_arn) = &self.role_arn {
            config = config.with_role_arn(role_arn.clone());
        }
        config
    }
}

fn default_backend() -> String {
    "memory".to_owned()
}

fn default_namespace_root() -> String {
    "blobs".to_owned()
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_retry_base_ms() -> u64 {
    100
}

fn default_region() -> String {
    "us-east-1".to_owned()
}
