//! S3-compatible object storage (AWS S3, DigitalOcean Spaces, MinIO).

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    presigning::PresigningConfig,
    primitives::ByteStream,
    types::ObjectCannedAcl,
    Client,
};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::config::StorageConfig;
use crate::metrics::STORAGE_OPERATIONS;

use super::error::StorageError;
use super::keys::{generate_storage_key, public_object_url};
use super::traits::ObjectStore;
use super::types::{SignedUrlGrant, StoredObject};

/// Object store backed by the S3 API.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    endpoint: String,
    force_path_style: bool,
}

impl S3ObjectStore {
    /// Create a client from explicit configuration.
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "zesha-config",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .force_path_style(config.force_path_style)
            .behavior_version_latest()
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            endpoint: config.endpoint.clone(),
            force_path_style: config.force_path_style,
        }
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url(&self.endpoint, &self.bucket, key, self.force_path_style)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn name(&self) -> &str {
        "s3"
    }

    async fn store(
        &self,
        namespace: &str,
        local_path: &Path,
        original_filename: &str,
    ) -> Result<StoredObject, StorageError> {
        let key = generate_storage_key(namespace, original_filename);
        let start = Instant::now();

        let size_bytes = tokio::fs::metadata(local_path)
            .await
            .map(|m| m.len())
            .map_err(|e| StorageError::ReadFailed {
                path: local_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StorageError::ReadFailed {
                path: local_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        debug!(bucket = %self.bucket, key = %key, size_bytes, "Uploading object");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| {
                STORAGE_OPERATIONS.with_label_values(&["store", "error"]).inc();
                error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "S3 upload failed"
                );
                StorageError::write_failed(&key, e)
            })?;

        STORAGE_OPERATIONS.with_label_values(&["store", "success"]).inc();
        info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes,
            duration_ms = start.elapsed().as_millis() as u64,
            "S3 upload successful"
        );

        let public_url = self.public_url(&key);
        Ok(StoredObject {
            key,
            public_url,
            size_bytes,
        })
    }

    async fn issue_signed_url(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<SignedUrlGrant, StorageError> {
        let presigning_config =
            PresigningConfig::expires_in(ttl).map_err(|e| StorageError::signing_failed(key, e))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| {
                STORAGE_OPERATIONS.with_label_values(&["sign", "error"]).inc();
                error!(error = %e, bucket = %self.bucket, key = %key, "Presigning failed");
                StorageError::signing_failed(key, e)
            })?;

        STORAGE_OPERATIONS.with_label_values(&["sign", "success"]).inc();
        debug!(key = %key, ttl_secs = ttl.as_secs(), "Issued presigned URL");

        Ok(SignedUrlGrant::issued_now(key, presigned.uri(), ttl))
    }
}
