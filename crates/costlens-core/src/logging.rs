//! Logging infrastructure for costlens.
//!
//! Structured logging using the `tracing` ecosystem.
//!
//! ## Features
//!
//! - JSON lines format for machine parsing
//! - File output to `~/.costlens/logs/costlens.log` (rotated daily)
//! - Console output to stderr with configurable verbosity
//! - `RUST_LOG` overrides the default filter
//!
//! ## Example
//!
//! ```no_run
//! use costlens_core::logging;
//!
//! let _guard = logging::init_logging(None, false).expect("logging init");
//!
//! tracing::info!("costlens started");
//! tracing::debug!(days_back = 30, "fetching records");
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{CostlensError, Result};
use crate::paths;

/// Guard that must be held to ensure log flushing on shutdown.
///
/// Keep this guard alive for the lifetime of the application.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the costlens logging system.
///
/// This sets up:
/// - File logging to `<log_dir>/costlens.log` (JSON lines format)
/// - Console logging to stderr (human-readable format)
///
/// # Arguments
///
/// * `log_dir` - Optional custom log directory. Defaults to `~/.costlens/logs/`
/// * `verbose` - If true, sets log level to DEBUG. Otherwise uses INFO.
///
/// Stdout is left untouched so command output can be piped.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => paths::default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| CostlensError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "costlens.log");
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "costlens={default_level},costlens_analytics={default_level}"
        ))
    });

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_span_list(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| CostlensError::LoggingInit {
            message: e.to_string(),
        })?;

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Initialize minimal console-only logging for testing.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Convenience macro for logging analytics results.
///
/// # Example
///
/// ```ignore
/// log_analytics_event!(operation = "forecast", points = 7);
/// ```
#[macro_export]
macro_rules! log_analytics_event {
    ($($field:tt)*) => {
        tracing::info!(
            target: "costlens::analytics",
            $($field)*,
            "analytics event"
        )
    };
}
