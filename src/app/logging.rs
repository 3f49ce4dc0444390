//! Usage: Process-wide tracing setup (stderr + daily log file under `<data dir>/logs`).

use crate::infra::app_paths;
use std::path::Path;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "egg-hatch-planner.log";
const DEFAULT_FILTER: &str = "info";

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the global subscriber once; later calls are no-ops.
pub fn init(data_dir: &Path) -> Result<(), String> {
    if FILE_GUARD.get().is_some() {
        return Ok(());
    }

    let dir = app_paths::logs_dir(data_dir);
    std::fs::create_dir_all(&dir)
        .map_err(|e| format!("LOG_IO: failed to create {}: {e}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false));

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Someone else (a test harness, an embedding host) owns the subscriber.
        return Ok(());
    }
    if FILE_GUARD.set(guard).is_err() {
        return Ok(());
    }
    let _ = tracing_log::LogTracer::init();

    tracing::info!(dir = %dir.display(), "logging initialized");
    Ok(())
}
