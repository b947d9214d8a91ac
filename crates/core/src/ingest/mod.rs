//! Request-scoped ingestion operations.
//!
//! [`IngestService`] is the single seam between transport handlers and the
//! storage, extraction and transcoding collaborators. Each operation
//! validates its input, calls the collaborators it needs in order, and maps
//! every failure to an [`IngestError`].

mod error;
mod service;
mod types;

pub use error::IngestError;
pub use service::IngestService;
pub use types::{HealthStatus, StagedFile, VideoAsset};
