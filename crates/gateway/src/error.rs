use thiserror::Error;

/// Errors returned by [`BlobGateway`](crate::BlobGateway) operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The backend failed, timed out, or exhausted its retries.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// No blob exists at the caller's key.
    #[error("blob not found")]
    NotFound,

    /// The blob could not be serialized into an envelope.
    #[error("failed to encode blob: {0}")]
    EncodeFailed(String),

    /// The stored bytes are not a valid envelope.
    #[error("failed to decode stored blob: {0}")]
    DecodeFailed(String),

    /// The gateway was built without a required component.
    #[error("configuration error: {0}")]
    Configuration(String),
}
