//! Background cleanup of local media files.
//!
//! Uploads are staged on disk and thumbnails accumulate in the public
//! directory. The janitor periodically removes files in those locations
//! that are older than a configured age.

mod runner;

pub use runner::{Janitor, SweepReport, SweepTarget};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while sweeping.
#[derive(Debug, Error)]
pub enum JanitorError {
    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
