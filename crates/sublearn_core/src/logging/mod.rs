//! Logging infrastructure.
//!
//! This module provides:
//! - Global `tracing` subscriber setup (stderr, optionally a rolling file)
//! - Per-file job loggers with file + callback output
//! - Tail buffer replayed when a file fails
//!
//! # Example
//!
//! ```no_run
//! use sublearn_core::logging::{JobLogger, LogConfig};
//!
//! let logger = JobLogger::new("movie", "/path/to/logs", LogConfig::default(), None).unwrap();
//!
//! logger.phase("Align");
//! logger.info("proportional-cadence: 812 cues");
//! logger.success("Wrote movie.sublearn.ass");
//! ```

mod job_logger;
mod types;

pub use job_logger::JobLogger;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
///
/// Should be called once at startup by the embedding application.
pub fn init_tracing(default_level: LogLevel) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(env_filter(default_level))
        .init();
}

/// Initialize global tracing with an additional daily-rolling log file.
///
/// The returned guard flushes the file writer on drop and must be kept
/// alive for as long as logging is needed.
pub fn init_tracing_with_file(default_level: LogLevel, log_dir: impl AsRef<Path>) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir.as_ref(), "sublearn.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_thread_ids(true),
        )
        .with(env_filter(default_level))
        .init();

    guard
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.as_filter()))
}
