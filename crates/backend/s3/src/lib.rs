//! AWS S3 object backend for blobvault.
//!
//! Blobs are stored in the bucket named by the storage key's namespace root,
//! at object key `{login}/{blob_id}`. Works against AWS and S3-compatible
//! endpoints (`MinIO`, `LocalStack`) via [`S3Config::endpoint_url`] and
//! [`S3Config::force_path_style`].

pub mod auth;
pub mod config;
pub mod error;
pub mod store;

pub use config::S3Config;
pub use store::S3Backend;
