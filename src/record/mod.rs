//! Log record model.
//!
//! # Responsibilities
//! - Severity levels (`level.rs`)
//! - Typed key/value attributes (`attr.rs`)
//! - The record handed to handlers (this file)
//!
//! # Design Decisions
//! - Records are owned values: each emit builds its own attribute list, so
//!   decorators can append without touching shared state
//! - Attribute order is the order of insertion; nothing reorders it

pub mod attr;
pub mod level;

pub use attr::{Attr, Value};
pub use level::Level;

use std::panic::Location;

use chrono::{DateTime, Utc};

/// A single log event on its way to a handler.
#[derive(Debug, Clone)]
pub struct Record {
    pub time: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    /// Caller location, when known.
    pub source: Option<&'static Location<'static>>,
    attrs: Vec<Attr>,
}

impl Record {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            time: Utc::now(),
            level,
            message: message.into(),
            source: None,
            attrs: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: &'static Location<'static>) -> Self {
        self.source = Some(source);
        self
    }

    /// Append attributes after the ones already present.
    pub fn add_attrs(&mut self, attrs: impl IntoIterator<Item = Attr>) {
        self.attrs.extend(attrs);
    }

    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    pub fn num_attrs(&self) -> usize {
        self.attrs.len()
    }
}
