pub mod config;
pub mod extractor;
pub mod ingest;
pub mod janitor;
pub mod metrics;
pub mod storage;
pub mod testing;
pub mod transcoder;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, SanitizedConfig,
};
pub use extractor::{
    ExtractorError, FfmpegExtractor, FormatInfo, MetadataExtractor, MetadataRecord,
    THUMBNAIL_OFFSET,
};
pub use ingest::{HealthStatus, IngestError, IngestService, StagedFile, VideoAsset};
pub use janitor::{Janitor, JanitorError, SweepReport, SweepTarget};
pub use storage::{
    ObjectStore, S3ObjectStore, SignedUrlGrant, StorageError, StoredObject, SIGNED_URL_TTL,
};
pub use transcoder::{JobStatus, ThetaClient, TranscodeClient, TranscodeError, TranscodeJob};
