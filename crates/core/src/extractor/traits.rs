//! Trait definitions for the extractor module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::ExtractorError;
use super::types::FormatInfo;

/// Derives a thumbnail and container facts from a readable video URL.
///
/// The two operations are independent; callers decide how to combine them.
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Returns the name of this extractor implementation.
    fn name(&self) -> &str;

    /// Writes the frame at `offset` into `output_path`.
    ///
    /// Fails with [`ExtractorError::FrameExtraction`] when the offset lies
    /// past the end of the stream or the source is unreadable. No other
    /// offset is tried.
    async fn extract_thumbnail(
        &self,
        source_url: &str,
        offset: Duration,
        output_path: &Path,
    ) -> Result<PathBuf, ExtractorError>;

    /// Probes the container format (no stream or codec inspection).
    async fn probe_format(&self, source_url: &str) -> Result<FormatInfo, ExtractorError>;

    /// Validates that the extractor is properly configured and ready.
    async fn validate(&self) -> Result<(), ExtractorError>;
}
