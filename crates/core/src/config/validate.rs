use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Storage bucket and credentials are present
/// - Transcoder credentials are present and the base URL is http(s)
/// - Janitor interval is positive when enabled
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.storage.bucket.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.bucket is required".to_string(),
        ));
    }

    if config.storage.access_key_id.is_empty() || config.storage.secret_access_key.is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.access_key_id and storage.secret_access_key are required".to_string(),
        ));
    }

    if config.transcoder.api_key.is_empty() || config.transcoder.api_secret.is_empty() {
        return Err(ConfigError::ValidationError(
            "transcoder.api_key and transcoder.api_secret are required".to_string(),
        ));
    }

    let base_url = &config.transcoder.base_url;
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "transcoder.base_url must be an http(s) URL, got '{}'",
            base_url
        )));
    }

    if config.janitor.enabled && config.janitor.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "janitor.interval_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
