//! `key=value` text sink.

use std::sync::Arc;

use crate::context::Context;
use crate::error::LogResult;
use crate::handler::sink::{HandlerOptions, SinkCore};
use crate::handler::writer::SharedWriter;
use crate::handler::Handler;
use crate::record::{Attr, Level, Record, Value};

/// Writes each record as space-separated `key=value` pairs on one line.
/// Keys inside groups are prefixed with the group path joined by `.`.
#[derive(Clone)]
pub struct TextHandler {
    core: SinkCore,
}

impl TextHandler {
    pub fn new(writer: SharedWriter, opts: HandlerOptions) -> Self {
        Self {
            core: SinkCore::new(writer, opts),
        }
    }
}

impl Handler for TextHandler {
    fn enabled(&self, _ctx: &Context, level: Level) -> bool {
        self.core.enabled(level)
    }

    fn handle(&self, _ctx: &Context, record: Record) -> LogResult<()> {
        let mut line = String::with_capacity(128);
        write_attrs(&mut line, "", &self.core.build(&record));
        line.push('\n');
        self.core.writer.write_record(line.as_bytes())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(Self {
            core: self.core.with_attrs(attrs),
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        Arc::new(Self {
            core: self.core.with_group(name),
        })
    }
}

fn write_attrs(line: &mut String, prefix: &str, attrs: &[Attr]) {
    for attr in attrs {
        let key = if prefix.is_empty() {
            attr.key.clone()
        } else {
            format!("{}.{}", prefix, attr.key)
        };

        match &attr.value {
            Value::Group(children) => write_attrs(line, &key, children),
            value => {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(&quote(&key));
                line.push('=');
                line.push_str(&quote(&value.to_string()));
            }
        }
    }
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '=' || c == '"')
}

fn quote(s: &str) -> String {
    if needs_quoting(s) {
        format!("{:?}", s)
    } else {
        s.to_string()
    }
}
