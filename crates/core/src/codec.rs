//! Conversion between wire bytes and [`Blob`] values.
//!
//! The envelope is a JSON object with exactly two fields:
//!
//! ```json
//! { "mimeType": "text/plain", "data": "aGVsbG8=" }
//! ```
//!
//! This is the same shape `GET /blob/{id}` returns, so a downloaded blob can
//! be uploaded again as a pre-serialized envelope.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde::{Deserialize, Serialize};

use crate::blob::Blob;
use crate::error::CodecError;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Envelope {
    mime_type: String,
    data: String,
}

/// Wrap a raw upload into a [`Blob`]. `raw` is copied, never modified.
pub fn encode(mime_type: impl Into<String>, raw: &[u8]) -> Blob {
    Blob::new(mime_type, raw.to_vec())
}

/// Serialize a blob into its envelope bytes.
pub fn serialize_envelope(blob: &Blob) -> Result<Vec<u8>, CodecError> {
    let envelope = Envelope {
        mime_type: blob.mime_type().to_owned(),
        data: blob.data_base64(),
    };
    serde_json::to_vec(&envelope).map_err(|e| CodecError::Serialize(e.to_string()))
}

/// Reconstruct a blob from envelope bytes.
///
/// Fails with [`CodecError::Corrupt`] when the input is not a complete
/// envelope: truncated or non-JSON bytes, missing or extra fields, or a
/// `data` field that is not valid base64.
pub fn decode_envelope(bytes: &[u8]) -> Result<Blob, CodecError> {
    let envelope: Envelope =
        serde_json::from_slice(bytes).map_err(|e| CodecError::Corrupt(e.to_string()))?;
    let payload = B64
        .decode(envelope.data.as_bytes())
        .map_err(|e| CodecError::Corrupt(format!("invalid base64 payload: {e}")))?;
    Ok(Blob::new(envelope.mime_type, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_copies_raw_bytes() {
        let raw = vec![1u8, 2, 3];
        let blob = encode("application/octet-stream", &raw);
        assert_eq!(blob.payload(), raw.as_slice());
        assert_eq!(raw, vec![1u8, 2, 3]);
    }

    #[test]
    fn envelope_round_trip() {
        let cases = [
            Blob::new("text/plain", b"hello".to_vec()),
            Blob::new("image/png", (0u8..=255).collect()),
            Blob::new("", Vec::new()),
        ];
        for blob in cases {
            let bytes = serialize_envelope(&blob).unwrap();
            assert_eq!(decode_envelope(&bytes).unwrap(), blob);
        }
    }

    #[test]
    fn envelope_is_plain_json() {
        let bytes = serialize_envelope(&Blob::new("text/plain", b"hello".to_vec())).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "mimeType": "text/plain", "data": "aGVsbG8=" })
        );
    }

    #[test]
    fn truncated_envelope_is_corrupt() {
        let bytes = serialize_envelope(&Blob::new("text/plain", b"hello".to_vec())).unwrap();
        let err = decode_envelope(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, CodecError::Corrupt(_)));
    }

    #[test]
    fn foreign_format_is_corrupt() {
        assert!(matches!(
            decode_envelope(b"\xac\xed\x00\x05sr\x00"),
            Err(CodecError::Corrupt(_))
        ));
        assert!(matches!(
            decode_envelope(br#"{"mimeType":"text/plain"}"#),
            Err(CodecError::Corrupt(_))
        ));
        assert!(matches!(
            decode_envelope(br#"{"mimeType":"text/plain","data":"aGk=","extra":1}"#),
            Err(CodecError::Corrupt(_))
        ));
        assert!(matches!(decode_envelope(b""), Err(CodecError::Corrupt(_))));
    }

    #[test]
    fn invalid_base64_is_corrupt() {
        let err = decode_envelope(br#"{"mimeType":"text/plain","data":"!!not base64!!"}"#)
            .unwrap_err();
        assert!(matches!(err, CodecError::Corrupt(msg) if msg.contains("base64")));
    }
}
