//! Logger construction and the process-wide instance.
//!
//! # Data Flow
//! ```text
//! Build (builder.rs):
//!     LoggerConfig → sink (json | text) → default attrs → group
//!         → ContextMiddleware → Logger
//!
//! Install (global.rs):
//!     init(config) → already set? return it
//!                  → build → compare-and-swap into the cell
//!                  → lost the race? return the winner
//! ```
//!
//! # Design Decisions
//! - First writer wins; later `init` calls are no-ops returning the
//!   installed logger
//! - `LoggerCell` is an ordinary value so tests and applications can own
//!   one; the process-wide cell is just a static instance of it
//! - Clearing a cell is only compiled for tests or with `test-util`

pub mod builder;
pub mod global;

pub use builder::{build_handler, build_logger};
pub use global::{default_logger, global, init, must_init, LoggerCell};

#[cfg(any(test, feature = "test-util"))]
pub use global::reset_global;
