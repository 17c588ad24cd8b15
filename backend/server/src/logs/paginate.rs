use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::types::{LogEntry, LogPage, LogQuery};

pub const ENTRIES_PER_PAGE: usize = 10;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Filter, sort (newest first) and slice entries for one page of the view.
///
/// A positive `limit` takes the first `limit` sorted entries and ignores the
/// page. The page is clamped into `1..=total_pages`, and is 1 when nothing
/// matches.
pub fn paginate(entries: Vec<LogEntry>, query: &LogQuery, per_page: usize) -> LogPage {
    let per_page = per_page.max(1);

    let mut entries: Vec<LogEntry> = match query.level.as_deref() {
        Some(level) => entries
            .into_iter()
            .filter(|entry| entry.level.to_lowercase() == level.to_lowercase())
            .collect(),
        None => entries,
    };

    // stable: undated entries trail the dated ones in input order
    entries.sort_by_cached_key(|entry| std::cmp::Reverse(parse_timestamp(&entry.timestamp)));

    let total_entries = entries.len();
    let total_pages = total_entries.div_ceil(per_page);
    let requested = query.page.unwrap_or(1).max(1);
    let current_page = usize::try_from(requested)
        .unwrap_or(usize::MAX)
        .min(total_pages.max(1));

    let selected = match query.limit {
        Some(limit) if limit > 0 => entries.into_iter().take(limit).collect(),
        _ => entries
            .into_iter()
            .skip((current_page - 1) * per_page)
            .take(per_page)
            .collect(),
    };

    LogPage {
        entries: selected,
        current_page,
        total_pages,
        total_entries,
    }
}

/// Parse the timestamp forms the log view understands. Zone-less forms are
/// read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn numbered(count: usize) -> Vec<LogEntry> {
        (1..=count)
            .map(|i| {
                LogEntry::new(
                    format!("2024-01-01T00:{:02}:00Z", 60 - i),
                    if i % 2 == 0 { "warn" } else { "INFO" },
                    format!("entry {i}"),
                )
            })
            .collect()
    }

    fn messages(page: &LogPage) -> Vec<String> {
        page.entries.iter().map(|entry| entry.message.clone()).collect()
    }

    fn expected(range: std::ops::RangeInclusive<usize>) -> Vec<String> {
        range.map(|i| format!("entry {i}")).collect()
    }

    fn page(number: i64) -> LogQuery {
        LogQuery {
            page: Some(number),
            ..LogQuery::default()
        }
    }

    #[test]
    fn test_first_and_last_page() {
        let first = paginate(numbered(25), &page(1), ENTRIES_PER_PAGE);
        assert_eq!(messages(&first), expected(1..=10));
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.total_entries, 25);

        let last = paginate(numbered(25), &page(3), ENTRIES_PER_PAGE);
        assert_eq!(messages(&last), expected(21..=25));
        assert_eq!(last.current_page, 3);
    }

    #[test]
    fn test_out_of_range_page_clamps() {
        let high = paginate(numbered(25), &page(4), ENTRIES_PER_PAGE);
        assert_eq!(high.current_page, 3);
        assert_eq!(messages(&high), expected(21..=25));

        let low = paginate(numbered(25), &page(-2), ENTRIES_PER_PAGE);
        assert_eq!(low.current_page, 1);
        assert_eq!(messages(&low), expected(1..=10));
    }

    #[test]
    fn test_limit_ignores_page() {
        let query = LogQuery {
            limit: Some(5),
            page: Some(3),
            ..LogQuery::default()
        };

        let limited = paginate(numbered(25), &query, ENTRIES_PER_PAGE);

        assert_eq!(messages(&limited), expected(1..=5));
        assert_eq!(limited.current_page, 3);
    }

    #[test]
    fn test_zero_limit_paginates() {
        let query = LogQuery {
            limit: Some(0),
            ..LogQuery::default()
        };

        let result = paginate(numbered(25), &query, ENTRIES_PER_PAGE);
        assert_eq!(messages(&result), expected(1..=10));
    }

    #[test]
    fn test_level_filter_is_case_insensitive() {
        let query = LogQuery {
            level: Some("Info".into()),
            ..LogQuery::default()
        };

        let result = paginate(numbered(25), &query, ENTRIES_PER_PAGE);

        assert_eq!(result.total_entries, 13);
        assert!(result.entries.iter().all(|entry| entry.level.to_lowercase() == "info"));
    }

    #[test]
    fn test_sorted_newest_first() {
        let mut entries = numbered(12);
        entries.reverse();

        let result = paginate(entries, &LogQuery::default(), 50);

        let stamps: Vec<DateTime<Utc>> = result
            .entries
            .iter()
            .map(|entry| parse_timestamp(&entry.timestamp).unwrap())
            .collect();
        assert!(stamps.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn test_undated_entries_sort_last() {
        let entries = vec![
            LogEntry::new("garbage", "info", "undated-1"),
            LogEntry::new("2024-01-01 08:00:00", "info", "older"),
            LogEntry::new("also garbage", "info", "undated-2"),
            LogEntry::new("2024-01-02T00:00:00+02:00", "info", "newer"),
        ];

        let result = paginate(entries, &LogQuery::default(), ENTRIES_PER_PAGE);

        assert_eq!(messages(&result), vec!["newer", "older", "undated-1", "undated-2"]);
    }

    #[test]
    fn test_no_matches_is_page_one() {
        let query = LogQuery {
            level: Some("debug".into()),
            page: Some(7),
            ..LogQuery::default()
        };

        let result = paginate(numbered(25), &query, ENTRIES_PER_PAGE);

        assert_eq!(result.total_pages, 0);
        assert_eq!(result.current_page, 1);
        assert!(result.entries.is_empty());
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let expected = parse_timestamp("2024-03-05T10:20:30Z");
        assert!(expected.is_some());
        assert_eq!(parse_timestamp("2024-03-05 10:20:30"), expected);
        assert_eq!(parse_timestamp("2024-03-05T10:20:30.000"), expected);
        assert_eq!(parse_timestamp("2024-03-05T12:20:30+02:00"), expected);
        assert!(parse_timestamp("2024-03-05").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
