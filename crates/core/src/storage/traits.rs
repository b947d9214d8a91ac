//! Trait definitions for the storage module.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use super::error::StorageError;
use super::types::{SignedUrlGrant, StoredObject};

/// A durable, key-addressed byte store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the name of this storage backend.
    fn name(&self) -> &str;

    /// Uploads the file at `local_path` under a freshly generated key in
    /// `namespace`, with public-read visibility.
    ///
    /// No retry is attempted; backend failures surface as-is.
    async fn store(
        &self,
        namespace: &str,
        local_path: &Path,
        original_filename: &str,
    ) -> Result<StoredObject, StorageError>;

    /// Issues a presigned GET URL for `key`, valid for exactly `ttl`.
    ///
    /// The key is not checked for existence.
    async fn issue_signed_url(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<SignedUrlGrant, StorageError>;
}
