use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;

/// A typed blob: a declared MIME type plus an opaque payload.
///
/// The payload is held as raw bytes. Base64 is only used when the blob is
/// written to an envelope or rendered in an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    mime_type: String,
    payload: Vec<u8>,
}

impl Blob {
    /// Create a blob that takes ownership of `payload`.
    pub fn new(mime_type: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            payload,
        }
    }

    /// Declared MIME type (may be empty for uploads that carried none).
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Payload encoded as standard base64 with padding.
    pub fn data_base64(&self) -> String {
        B64.encode(&self.payload)
    }
}
