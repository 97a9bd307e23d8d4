//! Logging setup for the dashboard host.
//!
//! Logs go to the console and, unless disabled, to daily-rolling files in the
//! platform data directory.
//!
//! ## Usage
//!
//! ```no_run
//! use ecommerce_eda::logging;
//!
//! // Initialize once at startup
//! logging::init(true).expect("Failed to initialize logging");
//!
//! tracing::info!("Dashboard started");
//! ```

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

const APP_DIR: &str = "ecommerce-eda";

/// Gets the log directory path based on platform conventions
///
/// Returns:
/// - Windows: `%APPDATA%/ecommerce-eda/logs`
/// - macOS: `~/Library/Application Support/ecommerce-eda/logs`
/// - Linux: `~/.local/share/ecommerce-eda/logs`
pub fn get_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;
    Ok(base_dir.join(APP_DIR).join("logs"))
}

/// Initializes the logging system
///
/// The console layer writes to stderr so rendered pages on stdout stay clean.
/// With `to_file`, two daily-rolling files are added:
/// - `ecommerce-eda.<date>.log`: everything passing the env filter
/// - `error.<date>.log`: warnings and errors only
///
/// # Errors
///
/// Returns error if the log directory cannot be created or a file appender fails
pub fn init(to_file: bool) -> Result<()> {
    // Default to INFO, allow override with RUST_LOG
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    if !to_file {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
        return Ok(());
    }

    let log_dir = get_log_dir()?;
    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }

    let all_logs_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix(APP_DIR)
        .filename_suffix("log")
        .build(&log_dir)
        .context("Failed to create all-logs file appender")?;

    let error_logs_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix("error")
        .filename_suffix("log")
        .build(&log_dir)
        .context("Failed to create error-logs file appender")?;

    let all_logs_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(all_logs_appender);

    let error_logs_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(error_logs_appender)
        .with_filter(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .init();

    tracing::info!("Logging initialized, log directory: {}", log_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_log_dir() {
        let log_dir = get_log_dir().expect("Failed to get log dir");
        assert!(
            log_dir.ends_with("ecommerce-eda/logs") || log_dir.ends_with("ecommerce-eda\\logs"),
            "unexpected log dir {}",
            log_dir.display()
        );
    }
}
