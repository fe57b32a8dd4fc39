//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that `format` and `level` parse
//! - Reject empty keys and names that would produce unreadable output
//! - Reject time patterns chrono cannot render
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: LoggerConfig → Result<(), Vec<String>>

use chrono::format::{Item, StrftimeItems};

use crate::config::schema::{LoggerConfig, Output};
use crate::record::Level;

pub fn validate_config(config: &LoggerConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Err(e) = config.format() {
        errors.push(e.to_string());
    }
    if let Err(e) = Level::parse(&config.level) {
        errors.push(e.to_string());
    }

    if let Some(pattern) = &config.time_format {
        if pattern.is_empty() {
            errors.push("time_format must not be empty".to_string());
        } else if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            errors.push(format!("invalid time_format {:?}", pattern));
        }
    }

    if let Output::File(path) = &config.output {
        if path.as_os_str().is_empty() {
            errors.push("output file path must not be empty".to_string());
        }
    }

    if config.redact_keys.iter().any(|k| k.trim().is_empty()) {
        errors.push("redact_keys must not contain empty keys".to_string());
    }

    if config.default_attrs.keys().any(|k| k.is_empty()) {
        errors.push("default_attrs must not contain empty keys".to_string());
    }

    if let Some(group) = &config.group {
        if group.trim().is_empty() {
            errors.push("group name must not be empty".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
