use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variables recognized for compatibility with existing deployments,
/// and the config keys they populate.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("DO_SPACES_KEY", "storage.access_key_id"),
    ("DO_SPACES_SECRET", "storage.secret_access_key"),
    ("DO_SPACES_BUCKET", "storage.bucket"),
    ("THETA_API_KEY", "transcoder.api_key"),
    ("THETA_API_SECRET", "transcoder.api_secret"),
];

fn legacy_env() -> Env {
    let names: Vec<&str> = LEGACY_ENV.iter().map(|(name, _)| *name).collect();
    Env::raw().only(&names).map(|key| {
        LEGACY_ENV
            .iter()
            .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
            .map(|(_, target)| (*target).into())
            .unwrap_or_else(|| key.into())
    })
}

fn base_figment() -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
}

fn with_env(figment: Figment) -> Figment {
    figment
        .merge(legacy_env())
        .merge(Env::prefixed("ZESHA_").split("__"))
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = with_env(base_figment().merge(Toml::file(path)))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from the environment only (no config file)
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    with_env(base_figment())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
