//! JSON lines sink.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::context::Context;
use crate::error::LogResult;
use crate::handler::sink::{HandlerOptions, SinkCore};
use crate::handler::writer::SharedWriter;
use crate::handler::Handler;
use crate::record::{Attr, Level, Record, Value};

/// Writes each record as one JSON object per line. Groups become nested
/// objects; durations are integer nanoseconds.
#[derive(Clone)]
pub struct JsonHandler {
    core: SinkCore,
}

impl JsonHandler {
    pub fn new(writer: SharedWriter, opts: HandlerOptions) -> Self {
        Self {
            core: SinkCore::new(writer, opts),
        }
    }
}

impl Handler for JsonHandler {
    fn enabled(&self, _ctx: &Context, level: Level) -> bool {
        self.core.enabled(level)
    }

    fn handle(&self, _ctx: &Context, record: Record) -> LogResult<()> {
        let tree = self.core.build(&record);
        let mut buf = serde_json::to_vec(&Object(&tree))?;
        buf.push(b'\n');
        self.core.writer.write_record(&buf)
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

/// Attributes written as a JSON object in order. Repeated keys are all
/// written.
struct Object<'a>(&'a [Attr]);

impl Serialize for Object<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for attr in self.0 {
            map.serialize_entry(&attr.key, &Json(&attr.value))?;
        }
        map.end()
    }
}

struct Json<'a>(&'a Value);

impl Serialize for Json<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::String(s) => serializer.serialize_str(s),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Uint(n) => serializer.serialize_u64(*n),
            // NaN and infinities have no JSON number form.
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Float(f) => serializer.collect_str(f),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Duration(d) => {
                serializer.serialize_i64(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
            }
            Value::Group(attrs) => Object(attrs).serialize(serializer),
        }
    }
}
