//! File logging. The terminal belongs to the editor, so events go to a file in the system
//! temp directory through a non-blocking writer.

use std::env;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_VAR: &str = "KASER_LOG";
pub const LOG_FILE: &str = "kaser-tui.log";
const DEFAULT_FILTER: &str = "warn";

/// Path the log is written to.
pub fn log_path() -> PathBuf {
    env::temp_dir().join(LOG_FILE)
}

/// Install the global subscriber. Keep the returned guard alive until exit so buffered
/// events are flushed; `None` means a subscriber was already installed.
pub fn init() -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let file_appender = tracing_appender::rolling::never(env::temp_dir(), LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|()| guard)
}
