use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "plugin-channel.log";

/// Keeps the non-blocking file writer alive; drop it last to flush pending lines.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Installs the global subscriber writing to a daily rolling file under `log_dir`.
///
/// `RUST_LOG` wins over `default_filter`. Returns `None` if the directory cannot be
/// created or a global subscriber is already set.
pub fn init(log_dir: &Path, default_filter: &str) -> Option<LoggingGuard> {
    let log_dir = if std::fs::create_dir_all(log_dir).is_ok() {
        log_dir.to_path_buf()
    } else {
        let dir = std::env::temp_dir().join("plugin-channel").join("logs");
        std::fs::create_dir_all(&dir).ok()?;
        dir
    };

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true),
    );

    if subscriber.try_init().is_err() {
        return None;
    }

    tracing::info!(log_dir = %log_dir.display(), "tracing initialized");

    Some(LoggingGuard {
        _guard: guard,
        log_dir,
    })
}

#[cfg(test)]
#[path = "../tests/unit/logging.rs"]
mod tests;
