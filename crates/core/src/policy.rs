use crate::blob::Blob;
use crate::error::PolicyError;

/// Content-type allow-list applied to blobs before they are persisted.
///
/// Matching is exact string comparison; there are no wildcards. An empty
/// list permits nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentPolicy {
    allowed: Vec<String>,
}

impl ContentPolicy {
    /// Build a policy from an ordered list of MIME types.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// The configured MIME types, in configuration order.
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// Returns `true` if `mime_type` is non-empty and listed.
    pub fn permits(&self, mime_type: &str) -> bool {
        !mime_type.is_empty() && self.allowed.iter().any(|m| m == mime_type)
    }

    /// Check a blob's declared MIME type against the allow-list.
    pub fn check(&self, blob: &Blob) -> Result<(), PolicyError> {
        if self.permits(blob.mime_type()) {
            Ok(())
        } else {
            Err(PolicyError::DisallowedContentType(
                blob.mime_type().to_owned(),
            ))
        }
    }
}
