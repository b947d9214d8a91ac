//! The ingestion orchestrator.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::extractor::{MetadataExtractor, MetadataRecord, THUMBNAIL_OFFSET};
use crate::metrics::{INGEST_DURATION, INGEST_OPERATIONS};
use crate::storage::{ObjectStore, SignedUrlGrant, SIGNED_URL_TTL};
use crate::transcoder::{JobStatus, TranscodeClient, TranscodeError, TranscodeJob};

use super::error::IngestError;
use super::types::{HealthStatus, StagedFile, VideoAsset};

/// Orchestrates uploads, signing, metadata extraction and transcoding.
///
/// Holds no mutable state; every operation is independent and safe to run
/// concurrently.
pub struct IngestService {
    store: Arc<dyn ObjectStore>,
    extractor: Arc<dyn MetadataExtractor>,
    transcoder: Arc<dyn TranscodeClient>,
    public_dir: PathBuf,
}

/// Trimmed, non-empty value of a required input.
fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, IngestError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(IngestError::bad_request(format!("{} is required", field)));
    }
    Ok(trimmed)
}

/// Runs one operation, recording its outcome and latency.
async fn instrumented<T, F>(operation: &'static str, fut: F) -> Result<T, IngestError>
where
    F: Future<Output = Result<T, IngestError>>,
{
    let start = Instant::now();
    let result = fut.await;

    let label = match &result {
        Ok(_) => "success",
        Err(e) => e.result_label(),
    };
    INGEST_OPERATIONS
        .with_label_values(&[operation, label])
        .inc();
    INGEST_DURATION
        .with_label_values(&[operation])
        .observe(start.elapsed().as_secs_f64());

    result
}

/// Service errors carry the provider's payload through; anything else is
/// reported with a generic message.
fn transcode_failure(err: TranscodeError, message: &str) -> IngestError {
    match err {
        TranscodeError::Service { error, .. } => IngestError::Upstream { error },
        other => IngestError::internal(message, other),
    }
}

impl IngestService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        extractor: Arc<dyn MetadataExtractor>,
        transcoder: Arc<dyn TranscodeClient>,
        public_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            extractor,
            transcoder,
            public_dir: public_dir.into(),
        }
    }

    /// Directory thumbnails are written to and served from.
    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    /// Store an uploaded video under `namespace` with public-read access.
    ///
    /// The staged file is removed once this returns.
    pub async fn upload_video(
        &self,
        namespace: &str,
        file: Option<StagedFile>,
    ) -> Result<VideoAsset, IngestError> {
        instrumented("upload_video", async {
            let file = file.ok_or_else(|| IngestError::bad_request("No video file found"))?;
            let namespace = require("namespace", namespace)?;

            let stored = self
                .store
                .store(namespace, file.path(), file.original_name())
                .await
                .map_err(|e| {
                    error!(
                        error = %e,
                        store = self.store.name(),
                        namespace = %namespace,
                        filename = %file.original_name(),
                        "Video upload failed"
                    );
                    IngestError::internal("Error uploading video", e)
                })?;

            info!(key = %stored.key, size_bytes = stored.size_bytes, "Video uploaded");

            Ok(VideoAsset {
                namespace: namespace.to_string(),
                storage_key: stored.key,
                source_url: Some(stored.public_url),
                size_bytes: stored.size_bytes,
            })
        })
        .await
    }

    /// Issue a 48-hour signed URL for `key`. Existence is not checked.
    pub async fn sign_url(&self, key: &str) -> Result<SignedUrlGrant, IngestError> {
        instrumented("sign_url", async {
            let key = require("key", key)?;

            self.store
                .issue_signed_url(key, SIGNED_URL_TTL)
                .await
                .map_err(|e| {
                    error!(error = %e, key = %key, "Presigning failed");
                    IngestError::internal("Error generating presigned url", e)
                })
        })
        .await
    }

    /// Grab a thumbnail at the fixed offset, then probe the container format.
    ///
    /// The probe only runs once the thumbnail exists.
    pub async fn extract_metadata(&self, url: &str) -> Result<MetadataRecord, IngestError> {
        instrumented("extract_metadata", async {
            let url = require("url", url)?;

            let thumbnail_name = format!("thumbnail-{}.jpg", Uuid::new_v4());
            let output_path = self.public_dir.join(&thumbnail_name);

            self.extractor
                .extract_thumbnail(url, THUMBNAIL_OFFSET, &output_path)
                .await
                .map_err(|e| {
                    error!(
                        error = %e,
                        extractor = self.extractor.name(),
                        url = %url,
                        "Thumbnail extraction failed"
                    );
                    IngestError::internal("Error generating metadata", e)
                })?;

            let format = self.extractor.probe_format(url).await.map_err(|e| {
                error!(
                    error = %e,
                    extractor = self.extractor.name(),
                    url = %url,
                    thumbnail = %thumbnail_name,
                    "Format probe failed"
                );
                IngestError::internal("Error generating metadata", e)
            })?;

            Ok(MetadataRecord::new(thumbnail_name, format))
        })
        .await
    }

    /// Submit a stored video to the transcoding service.
    pub async fn submit_transcode(
        &self,
        url: &str,
        collection_tag: Option<&str>,
    ) -> Result<TranscodeJob, IngestError> {
        instrumented("submit_transcode", async {
            let url = require("url", url)?;
            let collection_tag = collection_tag.filter(|tag| !tag.is_empty());

            self.transcoder
                .submit(url, collection_tag)
                .await
                .map_err(|e| {
                    error!(
                        error = %e,
                        transcoder = self.transcoder.name(),
                        url = %url,
                        "Transcode submission failed"
                    );
                    transcode_failure(e, "Error encoding video")
                })
        })
        .await
    }

    /// Ask the transcoding service for a job's current state.
    ///
    /// Nothing is cached; every call goes to the service.
    pub async fn poll_status(&self, job_id: &str) -> Result<JobStatus, IngestError> {
        instrumented("poll_status", async {
            let job_id = require("video_id", job_id)?;

            self.transcoder.get_status(job_id).await.map_err(|e| {
                error!(
                    error = %e,
                    transcoder = self.transcoder.name(),
                    job_id = %job_id,
                    "Transcode status lookup failed"
                );
                transcode_failure(e, "Cannot get video encoding status")
            })
        })
        .await
    }

    /// Copy an uploaded thumbnail into the public directory under a fresh
    /// name, returning that name.
    pub async fn upload_thumbnail(&self, file: Option<StagedFile>) -> Result<String, IngestError> {
        instrumented("upload_thumbnail", async {
            let file = file.ok_or_else(|| IngestError::bad_request("No thumbnail file found"))?;

            let name = format!("thumbnail-{}.jpg", Uuid::new_v4());
            let destination = self.public_dir.join(&name);

            let copied = async {
                tokio::fs::create_dir_all(&self.public_dir).await?;
                tokio::fs::copy(file.path(), &destination).await
            }
            .await;

            match copied {
                Ok(bytes) => {
                    info!(name = %name, bytes, "Thumbnail stored");
                    Ok(name)
                }
                Err(e) => {
                    error!(
                        error = %e,
                        source = %file.path().display(),
                        destination = %destination.display(),
                        "Thumbnail copy failed"
                    );
                    if let Err(cleanup) = tokio::fs::remove_file(&destination).await {
                        if cleanup.kind() != std::io::ErrorKind::NotFound {
                            warn!(error = %cleanup, "Failed to remove partial thumbnail");
                        }
                    }
                    Err(IngestError::internal("Error uploading thumbnail", e))
                }
            }
        })
        .await
    }

    pub fn health(&self) -> HealthStatus {
        INGEST_OPERATIONS
            .with_label_values(&["health", "success"])
            .inc();
        HealthStatus { status: "ok" }
    }
}
