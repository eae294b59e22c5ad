// Rust guideline compliant 2026-10-16

//! Tracing setup for the `libris` binary.
//!
//! Logs go to stderr so they never mix with command output on stdout. With
//! `--log-file` they go to that file instead, through a non-blocking writer
//! whose guard must outlive the command.

use anyhow::{anyhow, Result};
use std::fs::OpenOptions;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted when `--log-level` is absent.
pub const LOG_ENV: &str = "LIBRIS_LOG";

/// Filter used when neither the flag nor the variable is set.
pub const DEFAULT_FILTER: &str = "warn";

/// Builds the filter from the flag, then [`LOG_ENV`], then [`DEFAULT_FILTER`].
///
/// # Errors
///
/// Returns an error if the explicit `level` is not a valid filter directive.
pub fn build_filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|err| anyhow!("invalid log level '{level}': {err}")),
        None => Ok(EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Installs the global subscriber.
///
/// # Arguments
///
/// * `level` - Filter directive from `--log-level`
/// * `log_file` - Optional file to append logs to
///
/// # Returns
///
/// The writer guard when logging to a file.
///
/// # Errors
///
/// Returns an error if the filter is invalid or the log file cannot be
/// opened.
pub fn init(level: Option<&str>, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(level)?;

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .try_init();
        return Ok(Some(guard));
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(None)
}
