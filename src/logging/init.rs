use std::{
    path::Path,
    sync::{Mutex, OnceLock},
};

use anyhow::{Context, Result};

// Global guard to keep the file appender alive
static FILE_APPENDER_GUARD: OnceLock<Mutex<Option<tracing_appender::non_blocking::WorkerGuard>>> =
    OnceLock::new();

fn filter_directive(verbosity: u8) -> String {
    let base = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    std::env::var("RUST_LOG").unwrap_or_else(|_| base.to_string())
}

/// Flush and close the log file, if one was opened.
pub fn flush_logs() {
    if let Some(holder) = FILE_APPENDER_GUARD.get()
        && let Ok(mut guard) = holder.lock()
    {
        // Dropping the guard flushes pending lines
        drop(guard.take());
    }
}

/// Initialize tracing. RUST_LOG (if set) takes precedence.
/// Otherwise, -v/-vv map to "debug"/"trace".
///
/// With `log_file`, lines are also appended (without ANSI colors) to that file.
pub fn init_tracing(verbosity: u8, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter_layer =
        EnvFilter::try_new(filter_directive(verbosity)).context("invalid RUST_LOG / filter")?;

    let Some(path) = log_file else {
        // Console logs go to stderr; stdout carries only the publish summary
        let console_layer = fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr);

        // Allow re-init to be a no-op in tests
        let _ = tracing_subscriber::registry()
            .with(filter_layer)
            .with(console_layer)
            .try_init();
        return Ok(());
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .with_context(|| format!("log file path has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    if let Ok(mut holder) = FILE_APPENDER_GUARD.get_or_init(|| Mutex::new(None)).lock() {
        *holder = Some(guard);
    }

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(non_blocking);
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    Ok(())
}
