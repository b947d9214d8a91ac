//! Types for the extractor module.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Offset of the frame used as the representative thumbnail.
pub const THUMBNAIL_OFFSET: Duration = Duration::from_millis(3500);

/// Container-level facts reported by the probe.
///
/// Values are passed through as reported; fields the probe did not report
/// (or reported as `N/A`) are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Duration in seconds.
    pub duration: Option<f64>,
    /// Size in bytes.
    pub size: Option<u64>,
    /// Container tags (title, encoder, creation_time, ...).
    pub tags: Option<Map<String, Value>>,
    /// Comma-separated demuxer names, e.g. `mov,mp4,m4a,3gp,3g2,mj2`.
    pub format_name: Option<String>,
}

/// Metadata returned to the caller for one source URL. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// File name of the thumbnail inside the public directory.
    pub thumbnail_name: String,
    pub duration: Option<f64>,
    pub size: Option<u64>,
    pub tags: Option<Map<String, Value>>,
    pub format_name: Option<String>,
}

impl MetadataRecord {
    pub fn new(thumbnail_name: String, format: FormatInfo) -> Self {
        Self {
            thumbnail_name,
            duration: format.duration,
            size: format.size,
            tags: format.tags,
            format_name: format.format_name,
        }
    }
}
