pub mod blob;
pub mod codec;
pub mod error;
pub mod key;
pub mod policy;
pub mod profile;

pub use blob::Blob;
pub use codec::{decode_envelope, encode, serialize_envelope};
pub use error::{CodecError, PolicyError};
pub use key::{BlobId, StorageKey};
pub use policy::ContentPolicy;
pub use profile::Profile;
