//! Handler construction from configuration.

use std::fs::OpenOptions;
use std::sync::Arc;

use crate::config::{validate_config, Format, LoggerConfig, Output};
use crate::error::{LogError, LogResult};
use crate::handler::{
    ContextMiddleware, Handler, HandlerOptions, JsonHandler, SharedWriter, TextHandler,
};
use crate::logger::Logger;
use crate::record::Attr;

/// Build the full handler chain for `config` without installing it.
///
/// An unknown format or level is reported as such; any other problem is
/// reported as `LogError::Validation`.
pub fn build_handler(config: &LoggerConfig) -> LogResult<Arc<dyn Handler>> {
    let format = config.format()?;
    let level = config.level()?;
    validate_config(config).map_err(LogError::Validation)?;

    let writer = open_output(&config.output)?;
    let opts = HandlerOptions {
        level,
        add_source: config.add_source,
        short_source: config.short_source,
        time_format: config.time_format.clone(),
        use_utc: config.use_utc,
        redact_keys: config.redact_keys.clone(),
        replace_attr: config.replace_attr.clone(),
    };

    let mut handler: Arc<dyn Handler> = match format {
        Format::Json => Arc::new(JsonHandler::new(writer, opts)),
        Format::Text => Arc::new(TextHandler::new(writer, opts)),
    };

    let defaults: Vec<Attr> = config
        .default_attrs
        .iter()
        .map(|(key, value)| json_attr(key, value))
        .collect();
    if !defaults.is_empty() {
        handler = handler.with_attrs(defaults);
    }
    if let Some(group) = config.group.as_deref() {
        handler = handler.with_group(group);
    }

    Ok(ContextMiddleware::wrap(handler))
}

pub fn build_logger(config: &LoggerConfig) -> LogResult<Logger> {
    build_handler(config).map(Logger::new)
}

fn open_output(output: &Output) -> LogResult<SharedWriter> {
    Ok(match output {
        Output::Stdout => SharedWriter::stdout(),
        Output::Stderr => SharedWriter::stderr(),
        Output::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            SharedWriter::new(file)
        }
        Output::Custom(writer) => writer.clone(),
    })
}

fn json_attr(key: &str, value: &serde_json::Value) -> Attr {
    use serde_json::Value as Json;

    match value {
        Json::String(s) => Attr::string(key, s.as_str()),
        Json::Bool(b) => Attr::bool(key, *b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Attr::int(key, i)
            } else if let Some(u) = n.as_u64() {
                Attr::uint(key, u)
            } else {
                Attr::float(key, n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Json::Object(map) => Attr::group(key, map.iter().map(|(k, v)| json_attr(k, v))),
        other => Attr::string(key, other.to_string()),
    }
}
