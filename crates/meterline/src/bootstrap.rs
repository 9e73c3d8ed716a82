use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map the counted `-v` flag to a tracing filter directive.
///
/// Quiet runs only surface warnings; `-v` adds per-file progress, `-vv` the
/// full per-stage detail.
pub fn verbosity_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Logs always go to stderr; stdout is reserved for the batch report. With
/// `log_file` set, the same stream is additionally appended to that file.
/// The returned guard must stay alive until exit so buffered file output is
/// flushed.
pub fn setup_logging(verbose: u8, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_new(verbosity_filter(verbose)).unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    match log_file {
        Some(path) => {
            let log_dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            std::fs::create_dir_all(log_dir)?;
            let file_name = path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("meterline.log"));

            let file_appender = tracing_appender::rolling::never(log_dir, file_name);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking_file);

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            Ok(None)
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
