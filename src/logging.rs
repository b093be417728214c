use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "typist.log";

/// Install a file-backed subscriber. `RUST_LOG` wins over `debug`.
/// Returns `None` if a global subscriber was already installed.
pub fn init(log_dir: &Path, debug: bool) -> std::io::Result<Option<WorkerGuard>> {
    std::fs::create_dir_all(log_dir)?;

    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);

    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        // Global subscriber already installed; dropping the guard shuts the writer down.
        Err(_) => Ok(None),
    }
}
