use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Run `f` with console-only logging, for work that happens before the log
/// file is known (loading [`crate::config::Config`]).
pub fn with_startup_logging<T>(f: impl FnOnce() -> T) -> T {
    let subscriber = fmt().with_env_filter(env_filter()).finish();
    tracing::subscriber::with_default(subscriber, f)
}

/// Initialize logging to the console and to the structured log file.
///
/// The file layer writes one flattened JSON object per line
/// (`timestamp`, `level`, `message`, then the event fields), which is the
/// format `GET /api/logs` reads back. Keep the returned guard alive for the
/// lifetime of the process or buffered lines are lost on exit.
pub fn init_logging(log_file: &Path) -> Result<WorkerGuard> {
    let directory = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = log_file
        .file_name()
        .with_context(|| format!("log file path `{}` has no file name", log_file.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(directory)
        .with_context(|| format!("failed to open log file `{}`", log_file.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer())
        .with(
            fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_span_list(false)
                .with_ansi(false)
                .with_writer(writer),
        )
        .try_init()
        .context("failed to install the tracing subscriber")?;

    Ok(guard)
}
