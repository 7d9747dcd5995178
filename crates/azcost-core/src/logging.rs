//! Logging infrastructure for azcost.
//!
//! Structured logging via the `tracing` ecosystem:
//!
//! - JSON lines written to `~/.azcost/logs/azcost.log` (rolled daily)
//! - Compact human-readable warnings on stderr
//! - `-v` raises the default level to DEBUG; `RUST_LOG` overrides both
//!
//! ## Example
//!
//! ```no_run
//! use azcost_core::logging;
//!
//! let _guard = logging::init_logging(None, false).expect("logging init");
//! tracing::info!(resource_group = "rg-prod", "querying costs");
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{AzcostError, Result};

/// Name of the rolling log file.
pub const LOG_FILE_NAME: &str = "azcost.log";

/// Guard that must be held to ensure log flushing on shutdown.
///
/// Dropping it flushes pending log entries, so keep it alive for the
/// lifetime of the process.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the azcost logging system.
///
/// # Arguments
///
/// * `log_dir` - Optional custom log directory. Defaults to `~/.azcost/logs/`
/// * `verbose` - If true, sets log level to DEBUG. Otherwise uses INFO.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| AzcostError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_span_list(true);

    // stderr is shared with progress lines; only warnings unless verbose
    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(verbose)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact()
        .with_filter(console_level);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| AzcostError::internal(format!("failed to install subscriber: {e}")))?;

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Filter directive used when `RUST_LOG` is not set.
///
/// Covers the binary and every workspace crate, whose targets all start
/// with `azcost`.
pub fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!(
        "azcost={level},azcost_core={level},azcost_config={level},azcost_cost={level},\
         azcost_azure={level},azcost_output={level}"
    )
}

/// Initialize minimal console-only logging for testing.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Get the default log directory path: `~/.azcost/logs/`
pub fn default_log_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AzcostError::internal("could not determine home directory"))?;

    Ok(home.join(".azcost").join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_levels() {
        assert!(default_directive(false).starts_with("azcost=info"));
        assert!(default_directive(true).contains("azcost_cost=debug"));
        assert!(!default_directive(true).contains("info"));
    }

    #[test]
    fn test_default_log_dir_ends_with_logs() {
        if let Ok(dir) = default_log_dir() {
            assert!(dir.ends_with(".azcost/logs"));
        }
    }

    #[test]
    fn test_init_test_logging() {
        // Should not panic when called repeatedly
        init_test_logging();
        init_test_logging();
    }
}
