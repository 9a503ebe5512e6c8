use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use blobvault_core::Blob;

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status indicator.
    #[schema(example = "ok")]
    pub status: String,
}

/// Error body returned for every non-2xx response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message. Always `"unauthorized"` for 401.
    #[schema(example = "disallowed content type: 'application/x-executable'")]
    pub error: String,
}

/// A stored blob as returned by `GET /blob/{id}`.
///
/// Same shape as the envelope accepted by `POST /blob` with `isBlob=true`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlobResponse {
    /// Declared MIME type.
    #[schema(example = "text/plain")]
    pub mime_type: String,
    /// Payload, standard base64 with padding.
    #[schema(example = "aGVsbG8=")]
    pub data: String,
}

impl From<&Blob> for BlobResponse {
    fn from(blob: &Blob) -> Self {
        Self {
            mime_type: blob.mime_type().to_owned(),
            data: blob.data_base64(),
        }
    }
}

/// Multipart form accepted by `POST /blob`.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// The file. Its part `Content-Type` becomes the blob's MIME type.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// `true` if `file` is a blob envelope rather than raw content.
    #[schema(rename = "isBlob")]
    pub is_blob: Option<bool>,
}
