//! Mock metadata extractor for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::extractor::{ExtractorError, FormatInfo, MetadataExtractor};

/// Bytes written as the "thumbnail" (a JPEG SOI marker and padding).
const FAKE_JPEG: &[u8] = b"\xFF\xD8\xFF\xE0mock-thumbnail";

/// A recorded thumbnail request.
#[derive(Debug, Clone)]
pub struct ThumbnailCall {
    pub source_url: String,
    pub offset: Duration,
    pub output_path: PathBuf,
}

/// Mock implementation of [`MetadataExtractor`].
///
/// Sources have a configurable duration; grabbing a frame past the end
/// fails the way ffmpeg does. Unreachable sources fail both operations.
#[derive(Debug)]
pub struct MockExtractor {
    thumbnail_calls: Arc<RwLock<Vec<ThumbnailCall>>>,
    probe_calls: Arc<RwLock<Vec<String>>>,
    durations: Arc<RwLock<HashMap<String, f64>>>,
    unreachable: Arc<RwLock<HashSet<String>>>,
    format: Arc<RwLock<FormatInfo>>,
    thumbnail_error: Arc<RwLock<Option<ExtractorError>>>,
    probe_error: Arc<RwLock<Option<ExtractorError>>>,
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExtractor {
    pub fn new() -> Self {
        Self {
            thumbnail_calls: Arc::new(RwLock::new(Vec::new())),
            probe_calls: Arc::new(RwLock::new(Vec::new())),
            durations: Arc::new(RwLock::new(HashMap::new())),
            unreachable: Arc::new(RwLock::new(HashSet::new())),
            format: Arc::new(RwLock::new(FormatInfo {
                duration: Some(60.0),
                size: Some(10 * 1024 * 1024),
                tags: None,
                format_name: Some("mov,mp4,m4a,3gp,3g2,mj2".to_string()),
            })),
            thumbnail_error: Arc::new(RwLock::new(None)),
            probe_error: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn thumbnail_calls(&self) -> Vec<ThumbnailCall> {
        self.thumbnail_calls.read().await.clone()
    }

    /// Source URLs that were probed, in order.
    pub async fn probe_calls(&self) -> Vec<String> {
        self.probe_calls.read().await.clone()
    }

    /// Set the duration (seconds) of a source.
    pub async fn set_source_duration(&self, url: &str, secs: f64) {
        self.durations.write().await.insert(url.to_string(), secs);
    }

    /// Make a source unreachable.
    pub async fn set_unreachable(&self, url: &str) {
        self.unreachable.write().await.insert(url.to_string());
    }

    /// Set the format returned by every successful probe.
    pub async fn set_format(&self, format: FormatInfo) {
        *self.format.write().await = format;
    }

    /// Fail the next thumbnail extraction with the given error.
    pub async fn set_thumbnail_error(&self, error: ExtractorError) {
        *self.thumbnail_error.write().await = Some(error);
    }

    /// Fail the next probe with the given error.
    pub async fn set_probe_error(&self, error: ExtractorError) {
        *self.probe_error.write().await = Some(error);
    }
}

#[async_trait]
impl MetadataExtractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract_thumbnail(
        &self,
        source_url: &str,
        offset: Duration,
        output_path: &Path,
    ) -> Result<PathBuf, ExtractorError> {
        self.thumbnail_calls.write().await.push(ThumbnailCall {
            source_url: source_url.to_string(),
            offset,
            output_path: output_path.to_path_buf(),
        });

        if let Some(err) = self.thumbnail_error.write().await.take() {
            return Err(err);
        }

        let offset_ms = offset.as_millis() as u64;
        if self.unreachable.read().await.contains(source_url) {
            return Err(ExtractorError::frame_extraction(
                offset_ms,
                "FFmpeg exited with code: Some(1)",
                Some(format!("{}: Connection refused", source_url)),
            ));
        }

        if let Some(duration) = self.durations.read().await.get(source_url) {
            if offset.as_secs_f64() >= *duration {
                return Err(ExtractorError::frame_extraction(
                    offset_ms,
                    "no frame at offset (source shorter than offset?)",
                    None,
                ));
            }
        }

        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output_path, FAKE_JPEG).await?;
        Ok(output_path.to_path_buf())
    }

    async fn probe_format(&self, source_url: &str) -> Result<FormatInfo, ExtractorError> {
        self.probe_calls.write().await.push(source_url.to_string());

        if let Some(err) = self.probe_error.write().await.take() {
            return Err(err);
        }
        if self.unreachable.read().await.contains(source_url) {
            return Err(ExtractorError::probe(format!(
                "{}: Connection refused",
                source_url
            )));
        }

        let mut format = self.format.read().await.clone();
        if let Some(duration) = self.durations.read().await.get(source_url) {
            format.duration = Some(*duration);
        }
        Ok(format)
    }

    async fn validate(&self) -> Result<(), ExtractorError> {
        Ok(())
    }
}
