//! Logging Setup
//!
//! Installs the global `tracing` subscriber used by embedding applications.

use std::path::Path;
use std::sync::OnceLock;

use tracing_subscriber::{prelude::*, EnvFilter};

/// Log file prefix inside the log directory
pub const LOG_FILE_NAME: &str = "subtitleeditor.log";

/// Level used when `RUST_LOG` is unset or unparsable
const DEFAULT_DIRECTIVE: &str = "info";

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Installs stdout logging and, when `log_dir` is given, a daily-rolling
/// log file. The filter comes from `RUST_LOG`, at INFO by default.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_logging(log_dir: Option<&Path>) {
    let file_layer = log_dir.and_then(|dir| {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Log directory {} unavailable: {}", dir.display(), e);
            return None;
        }
        let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        if LOG_GUARD.set(guard).is_err() {
            // A previous call owns the writer; keep logging to stdout only.
            return None;
        }
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
    });

    let env_filter = env_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref());

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(cfg!(debug_assertions));

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer);

    // Already initialized (tests, embedding app) is fine.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// `RUST_LOG` directives when they parse, INFO otherwise
fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}
