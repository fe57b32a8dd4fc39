//! Record handlers.
//!
//! # Data Flow
//! ```text
//! Logger::info(&ctx, msg, attrs)
//!     → ContextMiddleware::handle   (appends the context bag's attributes)
//!     → JsonHandler / TextHandler   (groups, bound attrs, redaction, encode)
//!     → SharedWriter                (one locked write per record)
//! ```
//!
//! # Design Decisions
//! - Every handler exposes the same four operations, so decorators compose
//!   freely and can sit at the root of a chain
//! - Deriving a handler (`with_attrs`, `with_group`) returns a new handler;
//!   existing handlers are never mutated
//! - Handlers hold no per-call mutable state; write serialization is the
//!   writer's job

pub mod json;
pub mod middleware;
pub mod sink;
pub mod text;
pub mod writer;

pub use json::JsonHandler;
pub use middleware::ContextMiddleware;
pub use sink::{HandlerOptions, ReplaceAttr};
pub use text::TextHandler;
pub use writer::{MemoryWriter, SharedWriter};

use std::sync::Arc;

use crate::context::Context;
use crate::error::LogResult;
use crate::record::{Attr, Level, Record};

/// A structured-log handler.
pub trait Handler: Send + Sync {
    /// Whether records at `level` would be emitted. Checked before a record
    /// is built.
    fn enabled(&self, ctx: &Context, level: Level) -> bool;

    /// Emit one record.
    fn handle(&self, ctx: &Context, record: Record) -> LogResult<()>;

    /// A handler that also emits `attrs` on every record, inside the groups
    /// open on this handler.
    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler>;

    /// A handler that nests all subsequent attributes under `name`. An empty
    /// name opens no group.
    fn with_group(&self, name: &str) -> Arc<dyn Handler>;
}
