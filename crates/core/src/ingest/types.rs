//! Types for the ingest module.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tempfile::{NamedTempFile, TempPath};

/// An uploaded file staged on local disk.
///
/// The staged file is deleted when this value is dropped, whichever way the
/// operation consuming it ends.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
    original_name: String,
}

impl StagedFile {
    pub fn new(path: TempPath, original_name: impl Into<String>) -> Self {
        Self {
            path,
            original_name: original_name.into(),
        }
    }

    /// Stage an already-written temporary file.
    pub fn from_named(file: NamedTempFile, original_name: impl Into<String>) -> Self {
        Self::new(file.into_temp_path(), original_name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name as supplied by the client.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }
}

/// A video written to object storage. A new upload is always a new key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAsset {
    pub namespace: String,
    pub storage_key: String,
    /// Public URL of the stored object.
    pub source_url: Option<String>,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_staged_file_removed_on_drop() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"frame data").unwrap();
        let staged = StagedFile::from_named(file, "clip.mp4");

        let path = staged.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(staged.original_name(), "clip.mp4");

        drop(staged);
        assert!(!path.exists());
    }
}
