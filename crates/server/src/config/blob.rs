use serde::Deserialize;

use blobvault_core::ContentPolicy;

/// Upload acceptance settings.
///
/// ```toml
/// [blob]
/// allowed_content_types = ["image/png", "image/jpeg"]
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct BlobConfig {
    /// MIME types accepted on upload, compared exactly. Empty rejects all.
    #[serde(default)]
    pub allowed_content_types: Vec<String>,
}

impl BlobConfig {
    /// Build the content policy enforced on the store path.
    pub fn policy(&self) -> ContentPolicy {
        ContentPolicy::new(self.allowed_content_types.iter().cloned())
    }
}
