mod auth;
mod blob;
mod server;
mod storage;
mod telemetry;

#[cfg(test)]
mod tests;

pub use auth::*;
pub use blob::*;
pub use server::*;
pub use storage::*;
pub use telemetry::*;

use serde::Deserialize;

use crate::error::ServerError;

/// Top-level configuration for the blobvault server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct BlobvaultConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Bearer token verification.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Object backend and gateway settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Upload acceptance settings.
    #[serde(default)]
    pub blob: BlobConfig,
    /// OpenTelemetry distributed tracing configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl BlobvaultConfig {
    /// Check the settings required to serve requests.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.auth.jwt_secret.as_deref().is_none_or(str::is_empty) {
            return Err(ServerError::Config("auth.jwt_secret is required".into()));
        }
        if self.auth.issuer.as_deref().is_none_or(str::is_empty) {
            return Err(ServerError::Config("auth.issuer is required".into()));
        }
        if self.storage.namespace_root.is_empty() {
            return Err(ServerError::Config(
                "storage.namespace_root must not be empty".into(),
            ));
        }
        if self.storage.timeout_ms == 0 {
            return Err(ServerError::Config(
                "storage.timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
