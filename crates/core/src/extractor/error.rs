//! Error types for the extractor module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while extracting metadata.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// FFprobe binary not found.
    #[error("FFprobe not found at path: {path}")]
    FfprobeNotFound { path: PathBuf },

    /// No frame could be written at the requested offset.
    #[error("Failed to extract frame at {offset_ms} ms: {reason}")]
    FrameExtraction {
        offset_ms: u64,
        reason: String,
        stderr: Option<String>,
    },

    /// The source could not be probed.
    #[error("Failed to probe media: {reason}")]
    Probe { reason: String },

    /// Failed to parse FFprobe output.
    #[error("Failed to parse media info: {reason}")]
    Parse { reason: String },

    /// I/O error while running the tools.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractorError {
    /// Creates a new frame extraction error.
    pub fn frame_extraction(
        offset_ms: u64,
        reason: impl Into<String>,
        stderr: Option<String>,
    ) -> Self {
        Self::FrameExtraction {
            offset_ms,
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a new probe error.
    pub fn probe(reason: impl Into<String>) -> Self {
        Self::Probe {
            reason: reason.into(),
        }
    }
}
