//! File logging.
//!
//! Logs go to `$DIALTONE_HOME/logs/dialtone.log` so they never interleave with
//! the TUI or with command output. `DIALTONE_LOG` overrides the configured
//! filter.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, paths};

/// Environment variable holding a tracing filter (e.g. `dialtone_core=debug`).
pub const LOG_ENV: &str = "DIALTONE_LOG";

const LOG_FILE_NAME: &str = "dialtone.log";

/// Path of the log file.
pub fn log_file_path() -> PathBuf {
    paths::logs_dir().join(LOG_FILE_NAME)
}

fn filter_for(env_value: Option<&str>, default: &str) -> EnvFilter {
    env_value
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

/// Installs the global subscriber.
///
/// Returns the writer guard; keep it alive until exit so buffered lines are
/// flushed. Returns `None` if the log directory cannot be created or a
/// subscriber is already installed.
pub fn init(config: &Config) -> Option<WorkerGuard> {
    let dir = paths::logs_dir();
    if std::fs::create_dir_all(&dir).is_err() {
        return None;
    }

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_value = std::env::var(LOG_ENV).ok();
    let filter = filter_for(env_value.as_deref(), &config.log_filter);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .ok()
        .map(|()| guard)
}
