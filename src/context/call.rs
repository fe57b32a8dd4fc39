//! Immutable call-context.
//!
//! A `Context` is passed by reference down a call chain. Deriving a child
//! (`with_value`, `with_cancel`, `with_deadline`) never mutates the parent;
//! values are looked up from the newest binding to the oldest.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

/// Why a context is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneReason {
    Cancelled,
    DeadlineExceeded,
}

struct ValueNode {
    key: TypeId,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<ValueNode>>,
}

/// Request-scoped call-context carrying typed values, a deadline and a
/// cancellation signal. Cloning is cheap.
#[derive(Clone, Default)]
pub struct Context {
    values: Option<Arc<ValueNode>>,
    cancel: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl Context {
    /// The empty root context.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a child carrying `value`, keyed by its type.
    ///
    /// Callers should wrap values in a private newtype so no other module can
    /// read or shadow them.
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> Self {
        Self {
            values: Some(Arc::new(ValueNode {
                key: TypeId::of::<T>(),
                value: Arc::new(value),
                parent: self.values.clone(),
            })),
            cancel: self.cancel.clone(),
            deadline: self.deadline,
        }
    }

    /// The most recently bound value of type `T`.
    pub fn value<T: Any>(&self) -> Option<&T> {
        let key = TypeId::of::<T>();
        let mut node = self.values.as_deref();
        while let Some(n) = node {
            if n.key == key {
                return n.value.downcast_ref::<T>();
            }
            node = n.parent.as_deref();
        }
        None
    }

    /// Derive a cancellable child. Cancelling the parent also cancels it.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let token = match &self.cancel {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let child = Self {
            values: self.values.clone(),
            cancel: Some(token.clone()),
            deadline: self.deadline,
        };
        (child, CancelHandle(token))
    }

    /// Derive a child with a deadline. An earlier inherited deadline wins.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self {
            values: self.values.clone(),
            cancel: self.cancel.clone(),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// `None` while the context is still live.
    pub fn done_reason(&self) -> Option<DoneReason> {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Some(DoneReason::Cancelled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Some(DoneReason::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done_reason().is_some()
    }

    /// Wait until this context or an ancestor is cancelled. Never completes
    /// for a context without a cancellation signal.
    pub async fn cancelled(&self) {
        match &self.cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    }

    /// Wait until the context is cancelled or its deadline passes.
    pub async fn done(&self) -> DoneReason {
        let deadline = async {
            match self.deadline {
                Some(d) => tokio::time::sleep_until(tokio::time::Instant::from_std(d)).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancelled() => DoneReason::Cancelled,
            _ = deadline => DoneReason::DeadlineExceeded,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut depth = 0;
        let mut node = self.values.as_deref();
        while let Some(n) = node {
            depth += 1;
            node = n.parent.as_deref();
        }
        f.debug_struct("Context")
            .field("values", &depth)
            .field("deadline", &self.deadline)
            .field("done", &self.done_reason())
            .finish()
    }
}

/// Cancels the context returned alongside it by `Context::with_cancel`.
#[derive(Debug, Clone)]
pub struct CancelHandle(CancellationToken);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.cancel();
    }
}
