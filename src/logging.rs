//! Subscriber setup for the `courier` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the host. The binary picks one of two modes from `[logging]`:
//! with `logs_dir` set, dispatch decisions are kept as JSON lines in
//! `courier.log.<date>` for later inspection, otherwise they go to stderr
//! only. Both honour `RUST_LOG` and default to `info`.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// File name prefix of the rotated JSON log.
const LOG_FILE_PREFIX: &str = "courier.log";

/// Keeps the background log writer alive; drop it last to flush.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to a daily JSON file under `logs_dir`, mirrored to stderr.
///
/// # Errors
///
/// Fails if `logs_dir` cannot be created or another subscriber is already
/// installed.
pub fn init_production(logs_dir: &Path) -> anyhow::Result<LoggingGuard> {
    std::fs::create_dir_all(logs_dir).map_err(|e| {
        anyhow::anyhow!(
            "failed to create logs directory {}: {e}",
            logs_dir.display()
        )
    })?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX));

    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install subscriber: {e}"))?;

    Ok(LoggingGuard { _guard: guard })
}

/// Log to stderr only. A subscriber that is already installed wins.
pub fn init_cli() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}
