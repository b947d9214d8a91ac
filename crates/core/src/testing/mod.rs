//! Testing utilities and mock implementations.
//!
//! Mocks for every collaborator trait, so the ingest service and the HTTP
//! layer can be exercised without object storage, ffmpeg, or the
//! transcoding service.
//!
//! # Example
//!
//! ```rust,ignore
//! use zesha_core::testing::{MockExtractor, MockObjectStore, MockTranscodeClient};
//!
//! let extractor = MockExtractor::new();
//! extractor.set_source_duration("https://cdn/short.mp4", 2.0).await;
//!
//! let transcoder = MockTranscodeClient::new();
//! transcoder.set_status("video_mock0001", json!("finished"), json!(100)).await;
//! ```

mod mock_extractor;
mod mock_object_store;
mod mock_transcoder;

pub use mock_extractor::{MockExtractor, ThumbnailCall};
pub use mock_object_store::{MockObjectStore, RecordedStore};
pub use mock_transcoder::MockTranscodeClient;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::io::Write;
    use std::path::Path;

    use crate::config::{Config, MediaConfig};
    use crate::ingest::StagedFile;

    /// Stage `content` in a temp file as if it had been uploaded as `name`.
    pub fn staged_file(name: &str, content: &[u8]) -> StagedFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(content).expect("write temp file");
        StagedFile::from_named(file, name)
    }

    /// A valid configuration whose media directories live under `root`.
    pub fn config_in(root: &Path) -> Config {
        let mut config = Config {
            media: MediaConfig {
                public_dir: root.join("public"),
                staging_dir: root.join("tmp"),
            },
            ..Config::default()
        };
        config.storage.bucket = "test-bucket".to_string();
        config.storage.access_key_id = "test-key".to_string();
        config.storage.secret_access_key = "test-secret".to_string();
        config.transcoder.api_key = "srvacc_test".to_string();
        config.transcoder.api_secret = "test-secret".to_string();
        config
    }
}
