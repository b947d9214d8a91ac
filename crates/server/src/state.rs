use std::path::Path;
use std::sync::Arc;
use zesha_core::{Config, IngestService, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    ingest: Arc<IngestService>,
}

impl AppState {
    pub fn new(config: Config, ingest: Arc<IngestService>) -> Self {
        Self { config, ingest }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn ingest(&self) -> &IngestService {
        self.ingest.as_ref()
    }

    /// Where multipart uploads are spooled before processing.
    pub fn staging_dir(&self) -> &Path {
        &self.config.media.staging_dir
    }
}
