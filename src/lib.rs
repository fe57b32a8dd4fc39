//! Request-scoped structured logging.
//!
//! Callers attach request fields (user id, masked phone, SMS gate, message,
//! request id, or any extra key) to an immutable [`Context`]. Every record
//! logged with that context carries those fields, placed by a
//! [`ContextMiddleware`] in front of the JSON or text sink. Errors can carry
//! the context they were raised under to whoever finally logs them.
//!
//! # Architecture Overview
//!
//! ```text
//!   attach_user_id / attach_phone / ...        LoggerConfig (TOML)
//!              │                                      │
//!              ▼                                      ▼
//!          Context ──────────┐               lifecycle::build_handler
//!              │             │                        │
//!   ContextError::new        ▼                        ▼
//!   context_from_error    Logger ──▶ ContextMiddleware ──▶ JsonHandler / TextHandler
//!                                                                  │
//!                                                                  ▼
//!                                                             SharedWriter
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod lifecycle;
pub mod logger;
pub mod record;

pub use config::{load_config, LoggerConfig};
pub use context::{
    attach_bag, attach_field, attach_message, attach_new_request_id, attach_phone,
    attach_request_id, attach_sms_gate, attach_user_id, context_from_error, current_bag,
    wrap_error, Context, ContextBag, ContextError, ResultExt,
};
pub use error::{LogError, LogResult};
pub use handler::{ContextMiddleware, Handler, JsonHandler, TextHandler};
pub use lifecycle::{build_logger, default_logger, global, init, must_init, LoggerCell};
pub use logger::Logger;
pub use record::{Attr, Level, Record, Value};
