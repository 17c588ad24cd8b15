//! # Log Viewer
//!
//! Renders the service's own structured log file as an HTML table.
//!
//! The file is written by the JSON layer installed in [`crate::logging`], one
//! object per line. Every request reads it fresh, without locking, so a line
//! still being appended shows up as a malformed entry instead of failing the
//! request.
//!
//! Pipeline per request:
//!
//! read file
//! parse_entries
//! paginate (filter, sort, slice)
//! render_page
//!
//! Only the read can fail the request. A bad line is swapped for a synthetic
//! `error` entry and rendered like any other row.

use std::{io::ErrorKind, path::Path};

use tracing::{debug, error};

use crate::error::AppError;

mod paginate;
mod parse;
mod render;
mod types;

pub use paginate::{ENTRIES_PER_PAGE, paginate, parse_timestamp};
pub use parse::{parse_entries, parse_entries_at};
pub use render::{LOGS_PATH, page_url, render_page};
pub use types::{LogEntry, LogPage, LogQuery};

pub async fn read_log_file(path: &Path) -> Result<String, AppError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::LogFileNotFound),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read log file");
            Err(AppError::LogReadFailure(e.to_string()))
        }
    }
}

/// Read, parse, paginate and render the log file in one go.
pub async fn render_log_view(path: &Path, query: &LogQuery) -> Result<String, AppError> {
    let content = read_log_file(path).await?;
    let entries = parse_entries(&content);
    let page = paginate(entries, query, ENTRIES_PER_PAGE);

    debug!(
        total = page.total_entries,
        page = page.current_page,
        pages = page.total_pages,
        "Rendering log view"
    );

    Ok(render_page(&page, query))
}
