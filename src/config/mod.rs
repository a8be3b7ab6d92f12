mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use std::path::Path;
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads the service configuration.
///
/// Reads the YAML file named by `CONFIG_PATH`, falling back to `config.yaml`.
/// When `CONFIG_PATH` is unset and `config.yaml` is absent the built-in
/// defaults are used. `MODEL_PATH` overrides `model.path`.
pub async fn load() -> Result<Config> {
    let mut config = match env::var("CONFIG_PATH") {
        Ok(path) => load_from(&path).await?,
        Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => load_from(DEFAULT_CONFIG_PATH).await?,
        Err(_) => {
            debug!("No configuration file found, using defaults");
            Config::default()
        }
    };

    if let Ok(model_path) = env::var("MODEL_PATH") {
        debug!("MODEL_PATH overrides model path: {}", model_path);
        config.model.path = model_path;
    }

    Ok(config)
}

pub async fn load_from(config_path: &str) -> Result<Config> {
    debug!("Loading configuration from: {}", config_path);

    let config_str = tokio::fs::read_to_string(config_path)
        .await
        .map_err(|e| Error::config(format!("cannot read {}: {}", config_path, e)))?;
    let config = parse(&config_str)?;

    Ok(config)
}

pub fn parse(config_str: &str) -> Result<Config> {
    // An empty file deserializes to YAML null, which means "all defaults".
    if config_str.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(config_str)?;
    Ok(config)
}

/// Returns the effective log level: `RUST_LOG` when set, otherwise the
/// configured level. Either way the level must name a valid `LevelFilter`.
pub fn log_level(config: &Config, rust_log: Option<String>) -> Result<String> {
    let level = rust_log.unwrap_or_else(|| config.server.logs.level.clone());
    validate_log_level(&level)?;
    Ok(level)
}

/// Validates that a log level string is valid
pub fn validate_log_level(level: &str) -> Result<()> {
    level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .map_err(|_| {
            Error::config(format!(
                "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
                level
            ))
        })?;
    Ok(())
}
