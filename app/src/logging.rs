//! Tracing setup: stderr always, plus a daily rolling file when the
//! configuration names a log directory.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "sharewatch.log";

/// Daily rolling appender writing into `dir`, created if missing.
///
/// # Errors
///
/// Returns [`InitError`] when the directory cannot be created or the log
/// file cannot be opened.
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(dir)
}

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
///
/// An unusable log directory leaves logging on stderr only, with a warning.
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes and stops the file writer.
pub fn init(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let appender = log_dir.map(|dir| file_appender(dir).map_err(|e| (dir, e)));
    let (file, guard, failure) = match appender {
        Some(Ok(appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
                None,
            )
        }
        Some(Err(failure)) => (None, None, Some(failure)),
        None => (None, None, None),
    };

    if tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: a tracing subscriber was already installed");
    }
    if let Some((dir, e)) = failure {
        tracing::warn!(dir = %dir.display(), error = %e, "Log directory unusable, logging to stderr only");
    }
    guard
}
