//! Logger configuration.
//!
//! # Data Flow
//! ```text
//! logger.toml
//!     → loader.rs      (read & deserialize)
//!     → validation.rs  (semantic checks, all problems at once)
//!     → LoggerConfig   (validated)
//!     → lifecycle::build_logger / init
//! ```
//!
//! # Design Decisions
//! - Every field has a default so an empty file is a valid config
//! - `format` and `level` stay strings in the schema; they are checked by
//!   validation and parsed again when the handler is built
//! - The attribute rewrite hook and custom writers are code-only

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config};
pub use schema::{Format, LoggerConfig, Output};
pub use validation::validate_config;
