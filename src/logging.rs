//! Tracing subscriber setup shared by both binaries.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogConfig, LogMode};

/// Install the global subscriber.
///
/// Filtering follows `RUST_LOG` (default `info`). The returned guard must be
/// held for the life of the process or buffered lines are lost.
///
/// # Errors
/// Returns error if the log file cannot be opened.
pub fn init(config: &LogConfig) -> std::io::Result<WorkerGuard> {
    let (writer, guard) = match config.mode {
        LogMode::File => {
            if let Some(parent) = config.file.parent() {
                // Best-effort: opening the file below reports the real failure.
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.file)?;
            tracing_appender::non_blocking(file)
        }
        LogMode::Stdout => tracing_appender::non_blocking(std::io::stdout()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    Ok(guard)
}
