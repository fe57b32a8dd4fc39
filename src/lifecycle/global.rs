//! Exactly-once logger installation.

use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwapOption;

use crate::config::LoggerConfig;
use crate::error::LogResult;
use crate::handler::{ContextMiddleware, HandlerOptions, SharedWriter, TextHandler};
use crate::lifecycle::builder::build_logger;
use crate::logger::Logger;

/// A slot holding at most one installed logger.
///
/// The first successful `init` wins. Every later call, concurrent or not,
/// returns the installed logger and leaves it untouched.
#[derive(Default)]
pub struct LoggerCell {
    slot: ArcSwapOption<Logger>,
}

impl LoggerCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a logger built from `config`, unless one is already
    /// installed. Returns the logger now in the cell.
    ///
    /// `config` is neither built nor validated when the cell is already
    /// set.
    pub fn init(&self, config: &LoggerConfig) -> LogResult<Logger> {
        if let Some(existing) = self.get() {
            tracing::debug!("Logger already initialized, ignoring new config");
            return Ok(existing);
        }
        let candidate = build_logger(config)?;
        Ok(self.install(candidate, config))
    }

    /// Like `init`, but panics on an invalid config.
    pub fn must_init(&self, config: &LoggerConfig) -> Logger {
        match self.init(config) {
            Ok(logger) => logger,
            Err(e) => panic!("logger initialization failed: {}", e),
        }
    }

    pub fn get(&self) -> Option<Logger> {
        self.slot.load_full().map(|logger| logger.as_ref().clone())
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.load().is_some()
    }

    /// Empty the cell so the next `init` installs again.
    #[cfg(any(test, feature = "test-util"))]
    pub fn reset(&self) {
        self.slot.store(None);
    }

    fn install(&self, candidate: Logger, config: &LoggerConfig) -> Logger {
        let candidate = Arc::new(candidate);
        let previous = self
            .slot
            .compare_and_swap(&None::<Arc<Logger>>, Some(Arc::clone(&candidate)));

        match &*previous {
            None => {
                tracing::info!(
                    format = %config.format,
                    level = %config.level,
                    group = config.group.as_deref().unwrap_or(""),
                    "Logger installed"
                );
                candidate.as_ref().clone()
            }
            Some(winner) => {
                tracing::debug!("Lost logger initialization race, using installed logger");
                winner.as_ref().clone()
            }
        }
    }
}

impl std::fmt::Debug for LoggerCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerCell")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

fn global_cell() -> &'static LoggerCell {
    static CELL: OnceLock<LoggerCell> = OnceLock::new();
    CELL.get_or_init(LoggerCell::new)
}

/// Install the process-wide logger. See [`LoggerCell::init`].
pub fn init(config: &LoggerConfig) -> LogResult<Logger> {
    global_cell().init(config)
}

/// Install the process-wide logger, panicking on an invalid config.
pub fn must_init(config: &LoggerConfig) -> Logger {
    global_cell().must_init(config)
}

/// The process-wide logger, if one was installed.
pub fn global() -> Option<Logger> {
    global_cell().get()
}

/// The process-wide logger, or a text logger at INFO on stderr that still
/// carries context fields.
pub fn default_logger() -> Logger {
    static FALLBACK: OnceLock<Logger> = OnceLock::new();

    global().unwrap_or_else(|| {
        FALLBACK
            .get_or_init(|| {
                let sink = TextHandler::new(SharedWriter::stderr(), HandlerOptions::default());
                Logger::new(ContextMiddleware::wrap(Arc::new(sink)))
            })
            .clone()
    })
}

/// Clear the process-wide logger.
#[cfg(any(test, feature = "test-util"))]
pub fn reset_global() {
    global_cell().reset();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Output;
    use crate::context::Context;
    use crate::handler::MemoryWriter;
    use std::thread;

    fn capture_config(mem: &MemoryWriter, level: &str) -> LoggerConfig {
        LoggerConfig {
            level: level.to_string(),
            output: Output::Custom(SharedWriter::new(mem.clone())),
            ..Default::default()
        }
    }

    #[test]
    fn test_second_init_is_noop() {
        let cell = LoggerCell::new();
        let first_mem = MemoryWriter::new();
        let second_mem = MemoryWriter::new();

        let first = cell.init(&capture_config(&first_mem, "info")).unwrap();
        let second = cell.init(&capture_config(&second_mem, "debug")).unwrap();

        assert!(first.ptr_eq(&second));
        assert!(cell.get().unwrap().ptr_eq(&first));

        second.debug(&Context::background(), "filtered by first config", []);
        second.info(&Context::background(), "kept", []);
        assert_eq!(first_mem.lines().len(), 1);
        assert!(second_mem.contents().is_empty());
    }

    #[test]
    fn test_second_init_skips_validation() {
        let cell = LoggerCell::new();
        cell.init(&LoggerConfig {
            output: Output::Custom(SharedWriter::new(MemoryWriter::new())),
            ..Default::default()
        })
        .unwrap();

        let bad = LoggerConfig {
            format: "yaml".to_string(),
            ..Default::default()
        };
        assert!(cell.init(&bad).is_ok());
    }

    #[test]
    fn test_failed_init_leaves_cell_empty() {
        let cell = LoggerCell::new();
        let bad = LoggerConfig {
            level: "nope".to_string(),
            ..Default::default()
        };
        assert!(cell.init(&bad).is_err());
        assert!(!cell.is_initialized());
    }

    #[test]
    #[should_panic(expected = "logger initialization failed")]
    fn test_must_init_panics() {
        LoggerCell::new().must_init(&LoggerConfig {
            format: "yaml".to_string(),
            ..Default::default()
        });
    }

    #[test]
    fn test_concurrent_init_single_winner() {
        let cell = Arc::new(LoggerCell::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    let mem = MemoryWriter::new();
                    cell.init(&capture_config(&mem, "info")).unwrap()
                })
            })
            .collect();

        let loggers: Vec<Logger> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let installed = cell.get().unwrap();
        assert!(loggers.iter().all(|l| l.ptr_eq(&installed)));
    }

    #[test]
    fn test_reset_allows_reinit() {
        let cell = LoggerCell::new();
        let first = cell
            .init(&capture_config(&MemoryWriter::new(), "info"))
            .unwrap();
        cell.reset();
        assert!(cell.get().is_none());

        let second = cell
            .init(&capture_config(&MemoryWriter::new(), "info"))
            .unwrap();
        assert!(!first.ptr_eq(&second));
    }

    #[test]
    fn test_global_functions() {
        reset_global();
        let fallback = default_logger();
        assert!(global().is_none());
        assert!(default_logger().ptr_eq(&fallback));

        let mem = MemoryWriter::new();
        let installed = init(&capture_config(&mem, "info")).unwrap();
        assert!(global().unwrap().ptr_eq(&installed));
        assert!(default_logger().ptr_eq(&installed));
        assert!(must_init(&LoggerConfig::default()).ptr_eq(&installed));
        reset_global();
    }
}
