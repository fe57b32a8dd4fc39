//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::LoggerConfig;
use crate::config::validation::validate_config;
use crate::error::{LogError, LogResult};

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> LogResult<LoggerConfig> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), format = %config.format, level = %config.level, "Loaded logger config");
    Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> LogResult<LoggerConfig> {
    let config: LoggerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(LogError::Validation)?;
    Ok(config)
}
