//! # Tracing Setup
//!
//! Installs the global `tracing` subscriber used by the binaries:
//! - an `EnvFilter` taken from `RUST_LOG`, else the configured level;
//! - a console layer on stderr with targets and ANSI colors, leaving stdout
//!   to program output;
//! - optionally a JSON layer on a daily-rotating, non-blocking file writer.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter {filter:?}: {reason}")]
    Filter { filter: String, reason: String },

    #[error("failed to create log directory {path}: {source}")]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

/// What to log and where.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Filter directive used when `RUST_LOG` is not set, e.g. `info` or `lib_alphavantage=debug`.
    pub level: String,
    /// Directory for the rolling JSON log; `None` logs to the console only.
    pub log_dir: Option<PathBuf>,
    /// Prefix of the rolling log file names.
    pub file_prefix: String,
    pub ansi: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            file_prefix: "alphavantage".to_string(),
            ansi: true,
        }
    }
}

/// The filter in effect: `RUST_LOG` when it parses, else `level`.
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(level).map_err(|e| LoggingError::Filter {
            filter: level.to_string(),
            reason: e.to_string(),
        })
    })
}

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer when dropped, so callers keep it
/// alive for as long as they log. It is `None` when no log directory is set.
pub fn init_logging(options: &LoggingOptions) -> Result<Option<WorkerGuard>, LoggingError> {
    let env_filter = build_filter(&options.level)?;
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(options.ansi);

    let (file_layer, guard) = match &options.log_dir {
        Some(dir) => {
            fs::create_dir_all(dir).map_err(|source| LoggingError::LogDir {
                path: dir.clone(),
                source,
            })?;
            let (writer, guard) = non_blocking(rolling::daily(dir, &options.file_prefix));
            let layer = fmt::layer().with_ansi(false).with_writer(writer).json();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    info!(level = %options.level, log_dir = ?options.log_dir, "Logging initialized");
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_is_reported() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        match build_filter("lib_alphavantage=loud") {
            Err(LoggingError::Filter { filter, .. }) => assert_eq!(filter, "lib_alphavantage=loud"),
            other => panic!("unexpected {:?}", other.map(|f| f.to_string())),
        }
    }

    #[test]
    fn valid_levels_build() {
        assert!(build_filter("debug").is_ok());
        assert!(build_filter("lib_alphavantage=trace,reqwest=warn").is_ok());
    }

    #[test]
    fn file_logging_creates_directory_and_keeps_guard() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("nested");
        let options = LoggingOptions {
            log_dir: Some(log_dir.clone()),
            ansi: false,
            ..LoggingOptions::default()
        };

        // Only the first global init in the test binary can succeed.
        match init_logging(&options) {
            Ok(guard) => {
                assert!(guard.is_some());
                assert!(log_dir.is_dir());
            }
            Err(LoggingError::AlreadyInitialized(_)) => {}
            Err(other) => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            init_logging(&LoggingOptions::default()),
            Err(LoggingError::AlreadyInitialized(_))
        ));
    }
}
