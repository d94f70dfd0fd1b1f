use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "LADDER_CONFIG";

/// Configuration file used when `LADDER_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Bucket variables kept for deployments of the previous service.
const BUCKET_ENV_ALIASES: [(&str, &str); 2] = [
    ("AWS_DOWNLOAD_BUCKET_NAME", "storage.s3.source_bucket"),
    ("AWS_UPLOAD_BUCKET_NAME", "storage.s3.destination_bucket"),
];

/// Layers environment overrides on top of `base`.
///
/// `LADDER_SERVER__PORT=9000` sets `server.port`. The bucket aliases apply
/// first so `LADDER_STORAGE__S3__*` wins over them.
fn with_env(base: Figment) -> Figment {
    let mut figment = base;
    for (var, key) in BUCKET_ENV_ALIASES {
        figment = figment.merge(Env::raw().only(&[var]).map(move |_| key.into()));
    }
    figment.merge(Env::prefixed("LADDER_").ignore(&["config"]).split("__"))
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = with_env(Figment::new().merge(Toml::file(path)))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from defaults and environment variables only
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    with_env(Figment::new())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
