//! Logger front end.
//!
//! # Responsibilities
//! - Build records (time, level, message, caller location) from call sites
//! - Skip record construction when the handler is not enabled for a level
//! - Derive child loggers with bound attributes or groups
//!
//! # Design Decisions
//! - A `Logger` is a cheap handle around `Arc<dyn Handler>`; clone it freely
//! - `try_log` returns handler failures; the leveled helpers report them on
//!   the crate's own `tracing` diagnostics instead of panicking

use std::error::Error;
use std::panic::Location;
use std::sync::Arc;

use crate::context::{context_from_error, Context};
use crate::error::LogResult;
use crate::handler::Handler;
use crate::record::{Attr, Level, Record};

/// Key used by `log_error` for the error message.
pub const ERROR_KEY: &str = "error";

#[derive(Clone)]
pub struct Logger {
    handler: Arc<dyn Handler>,
}

impl Logger {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Whether both loggers share the same handler instance.
    pub fn ptr_eq(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.handler, &other.handler)
    }

    pub fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.handler.enabled(ctx, level)
    }

    /// A logger that emits `attrs` on every record.
    pub fn with(&self, attrs: impl IntoIterator<Item = Attr>) -> Logger {
        let attrs: Vec<Attr> = attrs.into_iter().collect();
        if attrs.is_empty() {
            return self.clone();
        }
        Logger::new(self.handler.with_attrs(attrs))
    }

    /// A logger whose subsequent attributes are nested under `name`.
    pub fn with_group(&self, name: &str) -> Logger {
        if name.is_empty() {
            return self.clone();
        }
        Logger::new(self.handler.with_group(name))
    }

    /// Emit a record and return the handler's result.
    #[track_caller]
    pub fn try_log(
        &self,
        ctx: &Context,
        level: Level,
        message: &str,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> LogResult<()> {
        self.emit(ctx, level, message, attrs, Location::caller())
    }

    /// Emit a record; a failed write is reported on the crate diagnostics.
    #[track_caller]
    pub fn log(
        &self,
        ctx: &Context,
        level: Level,
        message: &str,
        attrs: impl IntoIterator<Item = Attr>,
    ) {
        if let Err(e) = self.emit(ctx, level, message, attrs, Location::caller()) {
            tracing::error!(error = %e, level = %level, "Failed to write log record");
        }
    }

    #[track_caller]
    pub fn debug(&self, ctx: &Context, message: &str, attrs: impl IntoIterator<Item = Attr>) {
        self.log(ctx, Level::DEBUG, message, attrs);
    }

    #[track_caller]
    pub fn info(&self, ctx: &Context, message: &str, attrs: impl IntoIterator<Item = Attr>) {
        self.log(ctx, Level::INFO, message, attrs);
    }

    #[track_caller]
    pub fn warn(&self, ctx: &Context, message: &str, attrs: impl IntoIterator<Item = Attr>) {
        self.log(ctx, Level::WARN, message, attrs);
    }

    #[track_caller]
    pub fn error(&self, ctx: &Context, message: &str, attrs: impl IntoIterator<Item = Attr>) {
        self.log(ctx, Level::ERROR, message, attrs);
    }

    /// Log `err` at ERROR with the context that was bound to it, if any.
    #[track_caller]
    pub fn log_error(&self, ctx: &Context, message: &str, err: &(dyn Error + 'static)) {
        let ctx = context_from_error(ctx, err);
        self.log(
            &ctx,
            Level::ERROR,
            message,
            [Attr::string(ERROR_KEY, err.to_string())],
        );
    }

    fn emit(
        &self,
        ctx: &Context,
        level: Level,
        message: &str,
        attrs: impl IntoIterator<Item = Attr>,
        caller: &'static Location<'static>,
    ) -> LogResult<()> {
        if !self.handler.enabled(ctx, level) {
            return Ok(());
        }
        let mut record = Record::new(level, message).with_source(caller);
        record.add_attrs(attrs);
        self.handler.handle(ctx, record)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}
