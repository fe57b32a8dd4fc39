//! Errors that remember the logging context they were raised in.
//!
//! A background consumer often holds only the error. Binding a snapshot of
//! the `ContextBag` at wrap time lets it log the failure with the fields of
//! the request that produced it.

use std::error::Error;
use std::fmt;

use crate::context::bag::ContextBag;
use crate::context::call::Context;
use crate::context::{current_bag, install_bag};

type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// An error paired with the context fields present when it was wrapped.
///
/// `Display` is the inner error's message and `source()` returns the inner
/// error, so generic error handling sees the original failure.
pub struct ContextError {
    inner: BoxError,
    bag: ContextBag,
}

impl ContextError {
    pub fn new(ctx: &Context, err: impl Into<BoxError>) -> Self {
        Self {
            inner: err.into(),
            bag: current_bag(ctx),
        }
    }

    /// The fields bound at wrap time.
    pub fn bag(&self) -> &ContextBag {
        &self.bag
    }

    pub fn inner(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.inner.as_ref()
    }

    pub fn into_inner(self) -> BoxError {
        self.inner
    }
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextError")
            .field("inner", &self.inner)
            .field("bag", &self.bag)
            .finish()
    }
}

impl Error for ContextError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

/// Bind the context of `ctx` to `err`. `None` stays `None`.
pub fn wrap_error<E>(ctx: &Context, err: Option<E>) -> Option<ContextError>
where
    E: Into<BoxError>,
{
    err.map(|e| ContextError::new(ctx, e))
}

/// Rebuild a logging context from an error.
///
/// Walks the `source()` chain and installs the first bound bag found,
/// replacing whatever bag `ctx` already carries. Without one, `ctx` is
/// returned unchanged.
pub fn context_from_error(ctx: &Context, err: &(dyn Error + 'static)) -> Context {
    let mut cause = Some(err);
    while let Some(e) = cause {
        if let Some(bound) = e.downcast_ref::<ContextError>() {
            return install_bag(ctx, bound.bag.clone());
        }
        cause = e.source();
    }
    ctx.clone()
}

/// Bind the logging context to the error arm of a `Result`.
pub trait ResultExt<T> {
    fn with_log_context(self, ctx: &Context) -> Result<T, ContextError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    fn with_log_context(self, ctx: &Context) -> Result<T, ContextError> {
        self.map_err(|e| ContextError::new(ctx, e))
    }
}
