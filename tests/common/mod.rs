//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use logctx::config::Output;
use logctx::handler::{MemoryWriter, ReplaceAttr, SharedWriter};
use logctx::{build_logger, Attr, Logger, LoggerConfig};

/// A logger built from `config` whose output is captured in memory.
pub fn capture(config: LoggerConfig) -> (Logger, MemoryWriter) {
    let mem = MemoryWriter::new();
    let config = LoggerConfig {
        output: Output::Custom(SharedWriter::new(mem.clone())),
        ..config
    };
    let logger = build_logger(&config).unwrap();
    (logger, mem)
}

/// JSON logger at `level` capturing to memory.
pub fn json_logger(level: &str) -> (Logger, MemoryWriter) {
    capture(LoggerConfig {
        format: "json".to_string(),
        level: level.to_string(),
        ..Default::default()
    })
}

/// Text logger at `level` capturing to memory, with timestamps dropped so
/// lines are deterministic.
pub fn text_logger(level: &str) -> (Logger, MemoryWriter) {
    capture(LoggerConfig {
        format: "text".to_string(),
        level: level.to_string(),
        replace_attr: Some(drop_time()),
        ..Default::default()
    })
}

pub fn drop_time() -> ReplaceAttr {
    Arc::new(|groups: &[String], attr: Attr| {
        if groups.is_empty() && attr.key == "time" {
            Attr::string("", "")
        } else {
            attr
        }
    })
}

/// Parse every captured line as a JSON object.
pub fn entries(mem: &MemoryWriter) -> Vec<serde_json::Value> {
    mem.lines()
        .iter()
        .map(|line| serde_json::from_str(line).unwrap_or_else(|e| panic!("bad line {line:?}: {e}")))
        .collect()
}
