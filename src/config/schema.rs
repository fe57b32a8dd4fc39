//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LogError;
use crate::handler::{ReplaceAttr, SharedWriter};
use crate::record::Level;

/// Root logger configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Output encoding: `json` or `text`.
    pub format: String,

    /// Minimum level: a level name or an integer.
    pub level: String,

    /// Add the caller's `file:line` to each record.
    pub add_source: bool,

    /// Trim the source path to the file name.
    pub short_source: bool,

    /// chrono strftime pattern for timestamps. RFC 3339 with nanoseconds
    /// when unset.
    pub time_format: Option<String>,

    /// Write timestamps in UTC instead of local time.
    pub use_utc: bool,

    /// Destination for encoded records.
    pub output: Output,

    /// Attribute keys whose values are written as `***`.
    pub redact_keys: Vec<String>,

    /// Attributes added to every record, in file order.
    pub default_attrs: serde_json::Map<String, serde_json::Value>,

    /// Group that every non-builtin attribute is nested under.
    pub group: Option<String>,

    #[serde(skip)]
    pub replace_attr: Option<ReplaceAttr>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            level: "info".to_string(),
            add_source: false,
            short_source: true,
            time_format: None,
            use_utc: false,
            output: Output::Stdout,
            redact_keys: Vec::new(),
            default_attrs: serde_json::Map::new(),
            group: None,
            replace_attr: None,
        }
    }
}

impl LoggerConfig {
    /// The parsed output format.
    pub fn format(&self) -> Result<Format, LogError> {
        self.format.parse()
    }

    /// The parsed minimum level.
    pub fn level(&self) -> Result<Level, LogError> {
        Level::parse(&self.level)
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("format", &self.format)
            .field("level", &self.level)
            .field("add_source", &self.add_source)
            .field("short_source", &self.short_source)
            .field("time_format", &self.time_format)
            .field("use_utc", &self.use_utc)
            .field("output", &self.output)
            .field("redact_keys", &self.redact_keys)
            .field("default_attrs", &self.default_attrs)
            .field("group", &self.group)
            .field("replace_attr", &self.replace_attr.is_some())
            .finish()
    }
}

/// Record encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Text,
}

impl FromStr for Format {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "text" => Ok(Format::Text),
            _ => Err(LogError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => f.write_str("json"),
            Format::Text => f.write_str("text"),
        }
    }
}

/// Where records are written.
///
/// In TOML: `output = "stdout"`, `output = "stderr"` or
/// `output = { file = "/var/log/app.log" }`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Output {
    #[default]
    Stdout,
    Stderr,
    /// Appended to, created if missing.
    File(PathBuf),
    /// A writer supplied in code.
    #[serde(skip)]
    Custom(SharedWriter),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert_eq!(config.format().unwrap(), Format::Json);
        assert_eq!(config.level().unwrap(), Level::INFO);
        assert!(matches!(config.output, Output::Stdout));
        assert!(config.group.is_none());
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!(" TEXT ".parse::<Format>().unwrap(), Format::Text);
        assert!(matches!(
            "yaml".parse::<Format>(),
            Err(LogError::UnknownFormat(f)) if f == "yaml"
        ));
    }

    #[test]
    fn test_debug_hides_hook() {
        let config = LoggerConfig {
            replace_attr: Some(std::sync::Arc::new(|_: &[String], a: crate::record::Attr| a)),
            ..Default::default()
        };
        let shown = format!("{:?}", config);
        assert!(shown.contains("replace_attr: true"));
    }
}
