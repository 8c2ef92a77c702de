//! Logging and tracing configuration
//!
//! Progress lines for humans go to stdout through `colored`; tracing output
//! goes to stderr and, when requested, to a run log in the data directory.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::paths;

/// File name of the run log inside the log directory
const LOG_FILE: &str = "runner.log";

/// Initialize tracing for the CLI
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate (DEBUG with `verbose`), WARN for
/// dependencies. When `to_file` is set, a plain-text copy is appended to
/// the run log; keep the returned guard alive until exit so it is flushed.
pub fn init_cli(verbose: bool, to_file: bool) -> Option<WorkerGuard> {
    let default_directive = if verbose {
        "survey_e2e=debug,warn"
    } else {
        "survey_e2e=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let file_writer = if to_file {
        paths::log_dir().and_then(|dir| match std::fs::create_dir_all(&dir) {
            Ok(()) => Some(tracing_appender::non_blocking(
                tracing_appender::rolling::never(dir, LOG_FILE),
            )),
            Err(e) => {
                eprintln!("Warning: Could not create log directory: {}", e);
                None
            }
        })
    } else {
        None
    };

    match file_writer {
        Some((writer, guard)) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

/// Get the path to the run log file
pub fn log_file_path() -> Option<PathBuf> {
    paths::log_dir().map(|d| d.join(LOG_FILE))
}
