//! Upload, signing and metadata handlers.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{multipart::Field, rejection::JsonRejection, Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};
use zesha_core::{IngestError, StagedFile};

use super::error::ApiError;
use crate::metrics::UPLOAD_BYTES_TOTAL;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UploadVideoResponse {
    pub key: String,
}

/// Clients also send `namespace`; the key already embeds it, so it is
/// ignored.
#[derive(Debug, Deserialize)]
pub struct SignUrlRequest {
    #[serde(default)]
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct SignUrlResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct MetadataRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    pub thumbnail: String,
    pub duration: Option<f64>,
    pub size: Option<u64>,
    pub tags: Option<Map<String, Value>>,
    pub format_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ThumbnailResponse {
    pub name: String,
}

// ============================================================================
// Multipart staging
// ============================================================================

/// Stream a file field to a temp file in the staging directory.
///
/// Returns `None` for fields that carry no file name (plain form values, or
/// a file input left empty).
async fn stage_field(
    mut field: Field<'_>,
    staging_dir: &Path,
    failure_message: &str,
) -> Result<Option<StagedFile>, ApiError> {
    let original_name = match field.file_name() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Ok(None),
    };
    let field_name = field.name().unwrap_or_default().to_string();

    let io_failure = |e: std::io::Error| {
        error!(error = %e, staging_dir = %staging_dir.display(), "Failed to stage upload");
        ApiError::from(IngestError::internal(failure_message, e))
    };

    tokio::fs::create_dir_all(staging_dir)
        .await
        .map_err(io_failure)?;
    let temp = tempfile::Builder::new()
        .prefix("upload-")
        .tempfile_in(staging_dir)
        .map_err(io_failure)?;
    let (file, path) = temp.into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let mut written: u64 = 0;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await.map_err(io_failure)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(io_failure)?;

    UPLOAD_BYTES_TOTAL
        .with_label_values(&[field_name.as_str()])
        .inc_by(written);
    debug!(field = %field_name, filename = %original_name, bytes = written, "Staged upload");

    Ok(Some(StagedFile::new(path, original_name)))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/space-upload
///
/// Multipart fields: `namespace` (text) and `video` (file).
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadVideoResponse>, ApiError> {
    let mut namespace = String::new();
    let mut video: Option<StagedFile> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "namespace" => namespace = field.text().await?,
            "video" if video.is_none() => {
                video = stage_field(field, state.staging_dir(), "Error uploading video").await?;
            }
            _ => {}
        }
    }

    let asset = state.ingest().upload_video(&namespace, video).await?;
    Ok(Json(UploadVideoResponse {
        key: asset.storage_key,
    }))
}

/// POST /api/generate-signed-url
pub async fn generate_signed_url(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SignUrlRequest>, JsonRejection>,
) -> Result<Json<SignUrlResponse>, ApiError> {
    let Json(request) = body?;
    let grant = state.ingest().sign_url(&request.key).await?;
    Ok(Json(SignUrlResponse { url: grant.url }))
}

/// POST /api/get-video-metadata
pub async fn get_video_metadata(
    State(state): State<Arc<AppState>>,
    body: Result<Json<MetadataRequest>, JsonRejection>,
) -> Result<Json<MetadataResponse>, ApiError> {
    let Json(request) = body?;
    let record = state.ingest().extract_metadata(&request.url).await?;
    Ok(Json(MetadataResponse {
        thumbnail: record.thumbnail_name,
        duration: record.duration,
        size: record.size,
        tags: record.tags,
        format_name: record.format_name,
    }))
}

/// POST /api/upload-thumbnail
///
/// Multipart field: `thumbnail` (file).
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ThumbnailResponse>, ApiError> {
    let mut thumbnail: Option<StagedFile> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("thumbnail") && thumbnail.is_none() {
            thumbnail =
                stage_field(field, state.staging_dir(), "Error uploading thumbnail").await?;
        }
    }

    let name = state.ingest().upload_thumbnail(thumbnail).await?;
    Ok(Json(ThumbnailResponse { name }))
}
