//! Logging system initialization
//!
//! The terminal belongs to the UI, so log output goes to `formvis.log` in the
//! platform cache directory (or the configured directory). The previous
//! sessions' logs are kept as `formvis.log.1` .. `formvis.log.N`.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Historical log files kept besides the current one
const MAX_LOG_FILES: u8 = 4;

/// Directory the log file is written to
pub fn log_dir(app_name: &str, config: &LoggingConfig) -> Result<PathBuf> {
    match &config.directory {
        Some(dir) => Ok(dir.clone()),
        None => Ok(dirs::cache_dir()
            .ok_or_else(|| eyre!("Could not determine cache directory"))?
            .join(app_name)),
    }
}

/// Install the global tracing subscriber. Returns the log file path, or None
/// when logging is disabled.
///
/// `RUST_LOG` overrides the configured level.
pub fn init_logging(app_name: &str, config: &LoggingConfig) -> Result<Option<PathBuf>> {
    if !config.enabled {
        return Ok(None);
    }

    let dir = log_dir(app_name, config)?;
    std::fs::create_dir_all(&dir)?;
    let log_path = dir.join(format!("{app_name}.log"));
    rotate_logs_on_startup(&log_path)?;

    // Rotation happens once per session above, not by time
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(app_name)
        .filename_suffix("log")
        .build(&dir)
        .map_err(|e| eyre!("Failed to open log file in {}: {}", dir.display(), e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .with_writer(file_appender)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;

    tracing::info!("{} v{} started", app_name, env!("CARGO_PKG_VERSION"));

    Ok(Some(log_path))
}

/// Shift `name.log` -> `name.log.1` -> ... -> `name.log.MAX_LOG_FILES`, dropping the oldest.
fn rotate_logs_on_startup(log_path: &Path) -> Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let log_dir = log_path
        .parent()
        .ok_or_else(|| eyre!("Invalid log path: {}", log_path.display()))?;
    let log_name = log_path
        .file_name()
        .ok_or_else(|| eyre!("Invalid log filename: {}", log_path.display()))?
        .to_string_lossy();

    let oldest = log_dir.join(format!("{log_name}.{MAX_LOG_FILES}"));
    if oldest.exists() {
        std::fs::remove_file(&oldest)?;
    }

    for i in (1..MAX_LOG_FILES).rev() {
        let current = log_dir.join(format!("{log_name}.{i}"));
        if current.exists() {
            std::fs::rename(&current, log_dir.join(format!("{log_name}.{}", i + 1)))?;
        }
    }

    std::fs::rename(log_path, log_dir.join(format!("{log_name}.1")))?;
    Ok(())
}
