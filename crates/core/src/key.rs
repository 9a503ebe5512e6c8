use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::Profile;

/// Server-generated identifier of a stored blob (random 128-bit UUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobId(Uuid);

impl BlobId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for BlobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Fully qualified address of a blob in the object backend.
///
/// Rendered as `{namespace_root}/{login}/{blob_id}`. The login segment comes
/// from the verified token, never from the request, so two identities cannot
/// address the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    namespace_root: String,
    login: String,
    id: BlobId,
}

impl StorageKey {
    /// Derive the key for `id` under `profile`'s namespace.
    pub fn derive(namespace_root: &str, profile: &Profile, id: BlobId) -> Self {
        Self {
            namespace_root: namespace_root.to_owned(),
            login: profile.login.clone(),
            id,
        }
    }

    /// Top-level container (bucket) holding every identity prefix.
    pub fn namespace_root(&self) -> &str {
        &self.namespace_root
    }

    /// Identity segment.
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Blob identifier segment.
    pub fn id(&self) -> BlobId {
        self.id
    }

    /// Path of the object inside the namespace root: `{login}/{blob_id}`.
    pub fn object_path(&self) -> String {
        format!("{}/{}", self.login, self.id)
    }

    /// Full key string: `{namespace_root}/{login}/{blob_id}`.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace_root, self.login, self.id)
    }
}
