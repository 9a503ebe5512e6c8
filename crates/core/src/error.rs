use thiserror::Error;

/// Errors raised while converting between envelope bytes and [`Blob`](crate::Blob) values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The bytes could not be reconstructed into a blob (truncated input,
    /// foreign format, invalid base64 payload).
    #[error("corrupt blob envelope: {0}")]
    Corrupt(String),

    /// A blob value could not be written to its envelope form.
    #[error("failed to serialize blob envelope: {0}")]
    Serialize(String),
}

/// Errors raised by the content-type allow-list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The blob's declared MIME type is empty or not in the allow-list.
    #[error("disallowed content type: '{0}'")]
    DisallowedContentType(String),
}
