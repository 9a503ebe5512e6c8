use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_region() -> String {
    "us-east-1".to_owned()
}

fn default_operation_timeout_ms() -> u64 {
    30_000
}

/// Configuration for the S3 object backend.
///
/// Contains the region, an optional endpoint override for S3-compatible
/// services, and an optional STS assume-role ARN for cross-account buckets.
#[derive(Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// AWS region (e.g. `"us-east-1"`).
    #[serde(default = "default_region")]
    pub region: String,

    /// Optional endpoint URL override (e.g. `http://localhost:9000` for `MinIO`).
    pub endpoint_url: Option<String>,

    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`.
    /// Required by most S3-compatible servers.
    #[serde(default)]
    pub force_path_style: bool,

    /// Optional IAM role ARN to assume via STS.
    pub role_arn: Option<String>,

    /// Optional STS session name (defaults to `"blobvault-s3-backend"`).
    #[serde(default)]
    pub session_name: Option<String>,

    /// SDK-level timeout for a single S3 operation, in milliseconds.
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("force_path_style", &self.force_path_style)
            .field("role_arn", &self.role_arn.as_ref().map(|_| "[REDACTED]"))
            .field("session_name", &self.session_name)
            .field("operation_timeout_ms", &self.operation_timeout_ms)
            .finish()
    }
}

impl S3Config {
    /// Create a new `S3Config` with the given region.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }

    /// Set an endpoint URL override.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Enable or disable path-style bucket addressing.
    #[must_use]
    pub fn with_force_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }

    /// Set an IAM role ARN to assume via STS.
    #[must_use]
    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    /// Set the per-operation SDK timeout.
    #[must_use]
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// The per-operation SDK timeout as a [`Duration`].
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint_url: None,
            force_path_style: false,
            role_arn: None,
            session_name: None,
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }
}
