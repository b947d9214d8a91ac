//! Object storage for uploaded videos.
//!
//! Objects are written under `{namespace}/{uuid}-{sanitized filename}` with
//! public-read visibility. Read access for private consumers is granted with
//! stateless presigned URLs; nothing about issued grants is kept server-side.

mod error;
mod keys;
mod s3;
mod traits;
mod types;

pub use error::StorageError;
pub use keys::{generate_storage_key, public_object_url, sanitize_filename};
pub use s3::S3ObjectStore;
pub use traits::ObjectStore;
pub use types::{SignedUrlGrant, StoredObject, SIGNED_URL_TTL};
