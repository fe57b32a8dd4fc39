//! State and attribute processing shared by the JSON and text sinks.
//!
//! # Responsibilities
//! - Level filtering
//! - Tracking open groups and attributes bound with `with_attrs`
//! - Redaction and the `replace_attr` hook
//! - Building the attribute tree that the encoders walk
//!
//! # Design Decisions
//! - Bound attributes remember how many groups were open when they were
//!   bound; groups are only ever appended, so that depth is their path
//! - Attributes are processed at emit time, so redaction applies equally to
//!   bound and per-record attributes
//! - Groups that end up with no attributes are dropped

use std::collections::HashSet;
use std::fmt::{self, Write as _};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Local, SecondsFormat, Utc};

use crate::handler::writer::SharedWriter;
use crate::record::{Attr, Level, Record, Value};

pub const TIME_KEY: &str = "time";
pub const LEVEL_KEY: &str = "level";
pub const MESSAGE_KEY: &str = "msg";
pub const SOURCE_KEY: &str = "source";

/// Replacement value for redacted attributes.
pub const REDACTED: &str = "***";

/// Rewrites a non-group attribute before it is encoded. Receives the open
/// group path. Returning an attribute with an empty key drops it.
pub type ReplaceAttr = Arc<dyn Fn(&[String], Attr) -> Attr + Send + Sync>;

/// Options common to the built-in sinks.
#[derive(Clone, Default)]
pub struct HandlerOptions {
    /// Minimum level emitted.
    pub level: Level,
    /// Add a `source` attribute with the caller's `file:line`.
    pub add_source: bool,
    /// Trim `source` to the file name.
    pub short_source: bool,
    /// chrono strftime pattern; RFC 3339 with nanoseconds when `None`.
    pub time_format: Option<String>,
    /// Write timestamps in UTC instead of local time.
    pub use_utc: bool,
    /// Attribute keys whose values are replaced with `***`.
    pub redact_keys: Vec<String>,
    pub replace_attr: Option<ReplaceAttr>,
}

impl fmt::Debug for HandlerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerOptions")
            .field("level", &self.level)
            .field("add_source", &self.add_source)
            .field("short_source", &self.short_source)
            .field("time_format", &self.time_format)
            .field("use_utc", &self.use_utc)
            .field("redact_keys", &self.redact_keys)
            .field("replace_attr", &self.replace_attr.is_some())
            .finish()
    }
}

#[derive(Clone)]
pub(crate) struct SinkCore {
    opts: Arc<HandlerOptions>,
    redact: Arc<HashSet<String>>,
    pub(crate) writer: SharedWriter,
    groups: Vec<String>,
    bound: Vec<(usize, Vec<Attr>)>,
}

impl SinkCore {
    pub(crate) fn new(writer: SharedWriter, opts: HandlerOptions) -> Self {
        let redact = opts
            .redact_keys
            .iter()
            .filter(|k| !k.is_empty())
            .cloned()
            .collect();
        Self {
            opts: Arc::new(opts),
            redact: Arc::new(redact),
            writer,
            groups: Vec::new(),
            bound: Vec::new(),
        }
    }

    pub(crate) fn enabled(&self, level: Level) -> bool {
        level >= self.opts.level
    }

    pub(crate) fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        let mut core = self.clone();
        if !attrs.is_empty() {
            core.bound.push((self.groups.len(), attrs));
        }
        core
    }

    pub(crate) fn with_group(&self, name: &str) -> Self {
        let mut core = self.clone();
        if !name.is_empty() {
            core.groups.push(name.to_string());
        }
        core
    }

    /// The full attribute tree for `record`: built-ins first, then bound
    /// attributes, then the record's own, each nested at its group path.
    pub(crate) fn build(&self, record: &Record) -> Vec<Attr> {
        let mut root = Vec::with_capacity(4 + record.num_attrs());

        let mut builtins = vec![
            Attr::string(TIME_KEY, self.format_time(record.time)),
            Attr::string(LEVEL_KEY, record.level.to_string()),
        ];
        if self.opts.add_source {
            if let Some(loc) = record.source {
                builtins.push(Attr::string(SOURCE_KEY, self.format_source(loc.file(), loc.line())));
            }
        }
        builtins.push(Attr::string(MESSAGE_KEY, record.message.clone()));
        root.extend(self.process(&[], builtins));

        for (depth, attrs) in &self.bound {
            let path = &self.groups[..*depth];
            let processed = self.process(path, attrs.clone());
            insert_at(&mut root, path, processed);
        }

        let processed = self.process(&self.groups, record.attrs().to_vec());
        insert_at(&mut root, &self.groups, processed);

        root
    }

    fn process(&self, path: &[String], attrs: Vec<Attr>) -> Vec<Attr> {
        let mut out = Vec::with_capacity(attrs.len());
        for attr in attrs {
            match attr.value {
                Value::Group(children) if attr.key.is_empty() => {
                    out.extend(self.process(path, children));
                }
                Value::Group(children) => {
                    let mut child_path = path.to_vec();
                    child_path.push(attr.key.clone());
                    let children = self.process(&child_path, children);
                    if !children.is_empty() {
                        out.push(Attr::group(attr.key, children));
                    }
                }
                value => {
                    let mut attr = Attr { key: attr.key, value };
                    if self.redact.contains(&attr.key) {
                        attr.value = Value::String(REDACTED.to_string());
                    }
                    if let Some(replace) = &self.opts.replace_attr {
                        attr = replace(path, attr);
                    }
                    if !attr.key.is_empty() {
                        out.push(attr);
                    }
                }
            }
        }
        out
    }

    fn format_time(&self, time: DateTime<Utc>) -> String {
        match (&self.opts.time_format, self.opts.use_utc) {
            (Some(pattern), true) => format_with(time, pattern)
                .unwrap_or_else(|| time.to_rfc3339_opts(SecondsFormat::Nanos, true)),
            (Some(pattern), false) => {
                let local = time.with_timezone(&Local);
                format_with(local, pattern)
                    .unwrap_or_else(|| local.to_rfc3339_opts(SecondsFormat::Nanos, false))
            }
            (None, true) => time.to_rfc3339_opts(SecondsFormat::Nanos, true),
            (None, false) => time
                .with_timezone(&Local)
                .to_rfc3339_opts(SecondsFormat::Nanos, false),
        }
    }

    fn format_source(&self, file: &str, line: u32) -> String {
        let file = if self.opts.short_source {
            Path::new(file)
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or(file)
        } else {
            file
        };
        format!("{}:{}", file, line)
    }
}

/// `None` when `pattern` contains an invalid specifier.
fn format_with<Tz>(time: DateTime<Tz>, pattern: &str) -> Option<String>
where
    Tz: chrono::TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut out = String::new();
    write!(out, "{}", time.format(pattern)).ok()?;
    Some(out)
}

/// Append `attrs` under `path`, reusing a group already present at each
/// level.
fn insert_at(level: &mut Vec<Attr>, path: &[String], attrs: Vec<Attr>) {
    if attrs.is_empty() {
        return;
    }
    let Some((head, rest)) = path.split_first() else {
        level.extend(attrs);
        return;
    };

    let idx = match level.iter().rposition(|a| a.key == *head && a.is_group()) {
        Some(i) => i,
        None => {
            level.push(Attr::group(head.clone(), Vec::new()));
            level.len() - 1
        }
    };
    if let Value::Group(children) = &mut level[idx].value {
        insert_at(children, rest, attrs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::writer::MemoryWriter;

    fn core(opts: HandlerOptions) -> SinkCore {
        SinkCore::new(SharedWriter::new(MemoryWriter::new()), opts)
    }

    fn keys(attrs: &[Attr]) -> Vec<&str> {
        attrs.iter().map(|a| a.key.as_str()).collect()
    }

    #[test]
    fn test_builtins_order() {
        let record = Record::new(Level::INFO, "hi");
        let tree = core(HandlerOptions::default()).build(&record);
        assert_eq!(keys(&tree), ["time", "level", "msg"]);
        assert_eq!(tree[1].value, Value::from("INFO"));
        assert_eq!(tree[2].value, Value::from("hi"));
    }

    #[test]
    fn test_groups_and_bound_attrs() {
        let c = core(HandlerOptions::default())
            .with_attrs(vec![Attr::string("service", "sms")])
            .with_group("app")
            .with_attrs(vec![Attr::int("version", 2)])
            .with_group("req");

        let mut record = Record::new(Level::INFO, "hi");
        record.add_attrs([Attr::string("id", "r1")]);
        let tree = c.build(&record);

        assert_eq!(keys(&tree), ["time", "level", "msg", "service", "app"]);
        let Value::Group(app) = &tree[4].value else { panic!("app is not a group") };
        assert_eq!(keys(app), ["version", "req"]);
        let Value::Group(req) = &app[1].value else { panic!("req is not a group") };
        assert_eq!(keys(req), ["id"]);
    }

    #[test]
    fn test_empty_groups_omitted() {
        let c = core(HandlerOptions::default()).with_group("app");
        let mut record = Record::new(Level::INFO, "hi");
        record.add_attrs([Attr::group("empty", Vec::new())]);
        let tree = c.build(&record);
        assert_eq!(keys(&tree), ["time", "level", "msg"]);
    }

    #[test]
    fn test_empty_key_group_inlined() {
        let mut record = Record::new(Level::INFO, "hi");
        record.add_attrs([Attr::group("", [Attr::int("a", 1), Attr::int("b", 2)])]);
        let tree = core(HandlerOptions::default()).build(&record);
        assert_eq!(keys(&tree), ["time", "level", "msg", "a", "b"]);
    }

    #[test]
    fn test_redaction_at_depth() {
        let opts = HandlerOptions {
            redact_keys: vec!["token".into()],
            ..Default::default()
        };
        let c = core(opts)
            .with_attrs(vec![Attr::string("token", "bound-secret")])
            .with_group("auth");
        let mut record = Record::new(Level::INFO, "hi");
        record.add_attrs([Attr::string("token", "abc"), Attr::string("user", "u")]);
        let tree = c.build(&record);

        assert_eq!(tree[3].value, Value::from(REDACTED));
        let Value::Group(auth) = &tree[4].value else { panic!("auth is not a group") };
        assert_eq!(auth[0].value, Value::from(REDACTED));
        assert_eq!(auth[1].value, Value::from("u"));
    }

    #[test]
    fn test_replace_attr_can_drop_and_sees_groups() {
        let replace: ReplaceAttr = Arc::new(|groups: &[String], attr: Attr| {
            if attr.key == TIME_KEY {
                return Attr::string("", "");
            }
            if !groups.is_empty() {
                return Attr::string(attr.key, groups.join("/"));
            }
            attr
        });
        let opts = HandlerOptions {
            replace_attr: Some(replace),
            ..Default::default()
        };
        let c = core(opts).with_group("a").with_group("b");
        let mut record = Record::new(Level::INFO, "hi");
        record.add_attrs([Attr::int("n", 1)]);
        let tree = c.build(&record);

        assert_eq!(keys(&tree), ["level", "msg", "a"]);
        let Value::Group(a) = &tree[2].value else { panic!() };
        let Value::Group(b) = &a[0].value else { panic!() };
        assert_eq!(b[0].value, Value::from("a/b"));
    }

    #[test]
    fn test_source_short() {
        let opts = HandlerOptions {
            add_source: true,
            short_source: true,
            ..Default::default()
        };
        let record = Record::new(Level::INFO, "hi").with_source(std::panic::Location::caller());
        let tree = core(opts).build(&record);
        assert_eq!(tree[2].key, SOURCE_KEY);
        let source = tree[2].value.as_str().unwrap();
        assert!(source.starts_with("sink.rs:"), "{}", source);
    }

    #[test]
    fn test_time_format_utc() {
        let opts = HandlerOptions {
            time_format: Some("%Y".into()),
            use_utc: true,
            ..Default::default()
        };
        let record = Record::new(Level::INFO, "hi");
        let tree = core(opts).build(&record);
        assert_eq!(tree[0].value.as_str().unwrap(), record.time.format("%Y").to_string());
    }

    #[test]
    fn test_enabled() {
        let c = core(HandlerOptions {
            level: Level::WARN,
            ..Default::default()
        });
        assert!(!c.enabled(Level::INFO));
        assert!(c.enabled(Level::WARN));
        assert!(c.enabled(Level::ERROR));
    }
}
