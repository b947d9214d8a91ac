//! Error types for the storage module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to object storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The staged local file could not be opened.
    #[error("Failed to read staged file {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    /// The backend was unreachable or rejected the write.
    #[error("Failed to write object {key}: {reason}")]
    WriteFailed { key: String, reason: String },

    /// A presigned URL could not be produced.
    #[error("Failed to sign URL for {key}: {reason}")]
    SigningFailed { key: String, reason: String },
}

impl StorageError {
    pub fn write_failed(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::WriteFailed {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn signing_failed(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::SigningFailed {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}
