use std::path::Path;

use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::types::{CleanupConfig, LogLevel};

/// Environment variable the platform uses to request verbose output.
pub const BP_LOG_LEVEL: &str = "BP_LOG_LEVEL";

/// Load the cleanup configuration.
///
/// With no path the defaults are returned. A path that does not exist is an
/// error, since the caller asked for it explicitly.
pub fn load_config(path: Option<&Path>) -> Result<CleanupConfig, ConfigError> {
    let Some(path) = path else {
        debug!(event = "config.load_defaults");
        return Ok(CleanupConfig::default());
    };

    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let config: CleanupConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
            message: e.to_string(),
        })?;
    config.validate()?;

    info!(
        event = "config.load_completed",
        path = %path.display(),
        packages = config.packages.len(),
        pattern = %config.pattern
    );

    Ok(config)
}

impl LogLevel {
    pub fn from_env() -> Self {
        std::env::var(BP_LOG_LEVEL)
            .map(|v| LogLevel::parse(&v))
            .unwrap_or_default()
    }
}
