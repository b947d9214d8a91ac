//! Mock object store for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::storage::{generate_storage_key, ObjectStore, SignedUrlGrant, StorageError, StoredObject};

/// A recorded `store` call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedStore {
    pub namespace: String,
    pub original_filename: String,
    pub key: String,
    /// Bytes read from the staged file.
    pub content: Vec<u8>,
}

/// In-memory implementation of [`ObjectStore`].
///
/// - Reads the staged file and records its content
/// - Issues a distinct signed URL on every call
/// - Can be told to fail the next operation
#[derive(Debug)]
pub struct MockObjectStore {
    base_url: String,
    stores: Arc<RwLock<Vec<RecordedStore>>>,
    signed: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<StorageError>>>,
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self {
            base_url: "https://mock-bucket.storage.test".to_string(),
            stores: Arc::new(RwLock::new(Vec::new())),
            signed: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded store calls.
    pub async fn recorded_stores(&self) -> Vec<RecordedStore> {
        self.stores.read().await.clone()
    }

    pub async fn store_count(&self) -> usize {
        self.stores.read().await.len()
    }

    /// Keys for which a signed URL was issued, in order.
    pub async fn signed_keys(&self) -> Vec<String> {
        self.signed.read().await.clone()
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: StorageError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<StorageError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn store(
        &self,
        namespace: &str,
        local_path: &Path,
        original_filename: &str,
    ) -> Result<StoredObject, StorageError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let content = tokio::fs::read(local_path)
            .await
            .map_err(|e| StorageError::ReadFailed {
                path: local_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let key = generate_storage_key(namespace, original_filename);
        let size_bytes = content.len() as u64;

        self.stores.write().await.push(RecordedStore {
            namespace: namespace.to_string(),
            original_filename: original_filename.to_string(),
            key: key.clone(),
            content,
        });

        Ok(StoredObject {
            public_url: format!("{}/{}", self.base_url, key),
            key,
            size_bytes,
        })
    }

    async fn issue_signed_url(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<SignedUrlGrant, StorageError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.signed.write().await.push(key.to_string());
        let url = format!(
            "{}/{}?expires={}&signature={}",
            self.base_url,
            key,
            ttl.as_secs(),
            Uuid::new_v4().simple()
        );
        Ok(SignedUrlGrant::issued_now(key, url, ttl))
    }
}
