use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub janitor: JanitorConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted multipart body size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8090
}

fn default_max_upload_bytes() -> u64 {
    2 << 30
}

/// Local directories used by the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    /// Directory served as static files; thumbnails are written here.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    /// Directory where multipart uploads are staged before processing.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            public_dir: default_public_dir(),
            staging_dir: default_staging_dir(),
        }
    }
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("tmp")
}

/// S3-compatible object storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Storage endpoint (e.g., "https://nyc3.digitaloceanspaces.com")
    #[serde(default = "default_storage_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_storage_region")]
    pub region: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    /// Use `{endpoint}/{bucket}/{key}` addressing instead of virtual-hosted buckets.
    #[serde(default)]
    pub force_path_style: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: default_storage_endpoint(),
            region: default_storage_region(),
            bucket: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            force_path_style: false,
        }
    }
}

fn default_storage_endpoint() -> String {
    "https://nyc3.digitaloceanspaces.com".to_string()
}

fn default_storage_region() -> String {
    "us-east-1".to_string()
}

/// Theta Video API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscoderConfig {
    #[serde(default = "default_transcoder_base_url")]
    pub base_url: String,
    /// Service account id (sent as `x-tva-sa-id`)
    #[serde(default)]
    pub api_key: String,
    /// Service account secret (sent as `x-tva-sa-secret`)
    #[serde(default)]
    pub api_secret: String,
    /// Optional request timeout. Unset means requests run to completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            base_url: default_transcoder_base_url(),
            api_key: String::new(),
            api_secret: String::new(),
            timeout_secs: None,
        }
    }
}

fn default_transcoder_base_url() -> String {
    "https://api.thetavideoapi.com".to_string()
}

/// FFmpeg tooling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,
    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            ffmpeg_log_level: default_log_level(),
        }
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_log_level() -> String {
    "error".to_string()
}

/// Local file cleanup configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JanitorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between sweeps.
    #[serde(default = "default_janitor_interval")]
    pub interval_secs: u64,
    /// Files older than this are removed.
    #[serde(default = "default_janitor_max_age")]
    pub max_age_secs: u64,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_janitor_interval(),
            max_age_secs: default_janitor_max_age(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_janitor_interval() -> u64 {
    3600
}

fn default_janitor_max_age() -> u64 {
    24 * 3600
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub media: MediaConfig,
    pub storage: SanitizedStorageConfig,
    pub transcoder: SanitizedTranscoderConfig,
    pub extractor: ExtractorConfig,
    pub janitor: JanitorConfig,
}

/// Sanitized storage config (credentials hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub force_path_style: bool,
    pub credentials_configured: bool,
}

/// Sanitized transcoder config (API credentials hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTranscoderConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            media: config.media.clone(),
            storage: SanitizedStorageConfig {
                endpoint: config.storage.endpoint.clone(),
                region: config.storage.region.clone(),
                bucket: config.storage.bucket.clone(),
                force_path_style: config.storage.force_path_style,
                credentials_configured: !config.storage.access_key_id.is_empty()
                    && !config.storage.secret_access_key.is_empty(),
            },
            transcoder: SanitizedTranscoderConfig {
                base_url: config.transcoder.base_url.clone(),
                api_key_configured: !config.transcoder.api_key.is_empty()
                    && !config.transcoder.api_secret.is_empty(),
                timeout_secs: config.transcoder.timeout_secs,
            },
            extractor: config.extractor.clone(),
            janitor: config.janitor.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[storage]
bucket = "videos"
access_key_id = "key"
secret_access_key = "secret"

[transcoder]
api_key = "sa-id"
api_secret = "sa-secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.storage.bucket, "videos");
        assert_eq!(config.transcoder.api_key, "sa-id");
    }

    #[test]
    fn test_default_upload_limit_is_two_gib() {
        assert_eq!(ServerConfig::default().max_upload_bytes, 2_147_483_648);

        let config: Config = toml::from_str("[server]\nmax_upload_bytes = 8589934592").unwrap();
        assert_eq!(config.server.max_upload_bytes, 8 << 30);
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8090);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.media.public_dir, PathBuf::from("public"));
        assert_eq!(config.media.staging_dir, PathBuf::from("tmp"));
        assert_eq!(config.storage.endpoint, "https://nyc3.digitaloceanspaces.com");
        assert_eq!(config.storage.region, "us-east-1");
        assert!(!config.storage.force_path_style);
        assert_eq!(config.transcoder.base_url, "https://api.thetavideoapi.com");
        assert!(config.transcoder.timeout_secs.is_none());
        assert_eq!(config.extractor.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert!(config.janitor.enabled);
        assert_eq!(config.janitor.max_age_secs, 86400);
    }

    #[test]
    fn test_deserialize_janitor_disabled() {
        let toml = r#"
[janitor]
enabled = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.janitor.enabled);
        assert_eq!(config.janitor.interval_secs, 3600);
    }

    #[test]
    fn test_sanitized_config_hides_secrets() {
        let mut config = Config::default();
        config.storage.bucket = "videos".to_string();
        config.storage.access_key_id = "key".to_string();
        config.storage.secret_access_key = "super-secret".to_string();
        config.transcoder.api_key = "sa-id".to_string();

        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.storage.bucket, "videos");
        assert!(sanitized.storage.credentials_configured);
        // secret missing, so the transcoder is not fully configured
        assert!(!sanitized.transcoder.api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("super-secret"));
        assert!(!json.contains("sa-id"));
    }
}
