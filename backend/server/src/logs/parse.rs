use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::types::{LEVEL_KEY, LogEntry, MESSAGE_KEY, TIMESTAMP_KEY};

const MALFORMED_PREFIX: &str = "Malformed log entry: ";

/// Parse newline-delimited JSON into log entries, one per non-blank line.
///
/// Lines that are not JSON objects, or that lack a non-empty string
/// `timestamp`, `level` or `message`, become synthetic `error` entries
/// stamped with the current time.
pub fn parse_entries(content: &str) -> Vec<LogEntry> {
    parse_entries_at(content, Utc::now())
}

pub fn parse_entries_at(content: &str, now: DateTime<Utc>) -> Vec<LogEntry> {
    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_line(line).unwrap_or_else(|| malformed(&stamp, line)))
        .collect()
}

fn parse_line(line: &str) -> Option<LogEntry> {
    let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(line) else {
        return None;
    };

    let timestamp = required(&object, TIMESTAMP_KEY)?;
    let level = required(&object, LEVEL_KEY)?;
    let message = required(&object, MESSAGE_KEY)?;

    for key in [TIMESTAMP_KEY, LEVEL_KEY, MESSAGE_KEY] {
        object.shift_remove(key);
    }

    Some(LogEntry {
        timestamp,
        level,
        message,
        metadata: object,
    })
}

// empty strings count as missing
fn required(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn malformed(stamp: &str, line: &str) -> LogEntry {
    LogEntry::new(stamp, "error", format!("{MALFORMED_PREFIX}{line}"))
}
