//! Decorator that injects the request's context fields into every record.

use std::sync::Arc;

use crate::context::{bag_of, Context};
use crate::error::LogResult;
use crate::handler::Handler;
use crate::record::{Attr, Level, Record};

/// Wraps a handler and appends the attributes of the `ContextBag` carried by
/// the call-context to each record before delegating.
///
/// Holds nothing but the inner handler, so any number of callers may emit
/// through it concurrently. Deriving with `with_attrs` / `with_group`
/// re-wraps the inner handler's derived handler; context attributes then
/// land inside whatever groups the inner handler has open.
#[derive(Clone)]
pub struct ContextMiddleware {
    next: Arc<dyn Handler>,
}

impl ContextMiddleware {
    pub fn new(next: Arc<dyn Handler>) -> Self {
        Self { next }
    }

    /// Wrap `next` and erase the type.
    pub fn wrap(next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(Self::new(next))
    }

    pub fn inner(&self) -> &Arc<dyn Handler> {
        &self.next
    }
}

impl Handler for ContextMiddleware {
    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.next.enabled(ctx, level)
    }

    fn handle(&self, ctx: &Context, mut record: Record) -> LogResult<()> {
        if let Some(bag) = bag_of(ctx) {
            record.add_attrs(bag.attrs());
        }
        self.next.handle(ctx, record)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        ContextMiddleware::wrap(self.next.with_attrs(attrs))
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        ContextMiddleware::wrap(self.next.with_group(name))
    }
}
