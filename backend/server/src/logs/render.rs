use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use super::types::{LogEntry, LogPage, LogQuery};

pub const LOGS_PATH: &str = "/api/logs";

// RFC 3986 unreserved characters stay as-is
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const STYLES: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; padding: 24px; background: #f5f7fa; color: #1a202c; }
.log-container { max-width: 1440px; margin: 0 auto; padding: 24px; background: #fff; border-radius: 12px; box-shadow: 0 6px 12px rgba(0, 0, 0, 0.08); }
h1 { margin: 0 0 24px; font-size: 1.8rem; color: #2563eb; }
table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
th, td { padding: 12px 16px; text-align: left; vertical-align: top; border-bottom: 1px solid #e2e8f0; }
th { background: #3b82f6; color: #fff; text-transform: uppercase; font-size: 0.8rem; letter-spacing: 0.05em; }
tr:nth-child(even) { background: #f9fafb; }
.log-level-info { color: #10b981; font-weight: 600; }
.log-level-warn { color: #f59e0b; font-weight: 600; }
.log-level-error { color: #ef4444; font-weight: 600; }
.log-level-debug, .log-level-trace { color: #6b7280; font-weight: 600; }
.metadata { font-family: ui-monospace, monospace; font-size: 0.8rem; max-width: 400px; }
.metadata pre { margin: 0; padding: 8px; background: #f1f5f9; border-radius: 6px; white-space: pre-wrap; }
.pagination { display: flex; flex-wrap: wrap; justify-content: center; gap: 12px; margin-top: 24px; }
.pagination a { padding: 8px 14px; border: 1px solid #3b82f6; border-radius: 6px; color: #3b82f6; text-decoration: none; }
.pagination a.active { background: #3b82f6; color: #fff; }
.pagination a.disabled { color: #d1d5db; border-color: #d1d5db; pointer-events: none; }
"#;

/// Render one page of log entries as a complete HTML document.
pub fn render_page(page: &LogPage, query: &LogQuery) -> String {
    let mut html = String::with_capacity(4096 + page.entries.len() * 256);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<title>Application Logs</title>\n");
    html.push_str("<style>");
    html.push_str(STYLES);
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str("<div class=\"log-container\">\n<h1>Application Logs</h1>\n");
    html.push_str("<table>\n<thead>\n<tr>");
    for heading in ["Timestamp", "Level", "Message", "Metadata"] {
        html.push_str("<th>");
        html.push_str(heading);
        html.push_str("</th>");
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for entry in &page.entries {
        push_row(&mut html, entry);
    }

    html.push_str("</tbody>\n</table>\n");
    push_pagination(&mut html, page, query);
    html.push_str("</div>\n</body>\n</html>\n");

    html
}

fn push_row(html: &mut String, entry: &LogEntry) {
    html.push_str("<tr>\n<td>");
    push_escaped(html, &entry.timestamp);
    html.push_str("</td>\n<td class=\"log-level-");
    push_escaped(html, &entry.level.to_lowercase());
    html.push_str("\">");
    push_escaped(html, &entry.level);
    html.push_str("</td>\n<td>");
    push_escaped(html, &entry.message);
    html.push_str("</td>\n<td class=\"metadata\">");
    push_metadata(html, entry);
    html.push_str("</td>\n</tr>\n");
}

fn push_metadata(html: &mut String, entry: &LogEntry) {
    let pretty = match serde_json::to_string_pretty(&entry.metadata) {
        Ok(pretty) if !entry.metadata.is_empty() => pretty,
        _ => return html.push('-'),
    };

    html.push_str("<pre>");
    push_escaped(html, &pretty);
    html.push_str("</pre>");
}

fn push_pagination(html: &mut String, page: &LogPage, query: &LogQuery) {
    let current = page.current_page;
    let last = page.total_pages;

    html.push_str("<div class=\"pagination\">\n");

    push_link(
        html,
        &page_url(query, current.saturating_sub(1).max(1)),
        if current <= 1 { "disabled" } else { "" },
        "Previous",
    );

    for number in 1..=last {
        push_link(
            html,
            &page_url(query, number),
            if number == current { "active" } else { "" },
            &number.to_string(),
        );
    }

    push_link(
        html,
        &page_url(query, (current + 1).min(last.max(1))),
        if current >= last { "disabled" } else { "" },
        "Next",
    );

    html.push_str("</div>\n");
}

fn push_link(html: &mut String, href: &str, class: &str, label: &str) {
    html.push_str("<a href=\"");
    push_escaped(html, href);
    html.push_str("\" class=\"");
    html.push_str(class);
    html.push_str("\">");
    html.push_str(label);
    html.push_str("</a>\n");
}

/// Build the link for `page_number`, keeping the active filter and limit.
pub fn page_url(query: &LogQuery, page_number: usize) -> String {
    let mut params = Vec::with_capacity(3);

    if let Some(level) = query.level.as_deref().filter(|level| !level.is_empty()) {
        params.push(format!("level={}", utf8_percent_encode(level, QUERY_VALUE)));
    }
    if let Some(limit) = query.limit.filter(|limit| *limit > 0) {
        params.push(format!("limit={limit}"));
    }
    params.push(format!("page={page_number}"));

    format!("{LOGS_PATH}?{}", params.join("&"))
}

/// Append `text` to `html`, escaping the characters that can break out of
/// element content or a double-quoted attribute.
fn push_escaped(html: &mut String, text: &str) {
    let mut rest = text;

    while let Some(at) = rest.find(['&', '<', '>', '"', '\'']) {
        html.push_str(&rest[..at]);
        html.push_str(match rest.as_bytes()[at] {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            _ => "&#x27;",
        });
        rest = &rest[at + 1..];
    }

    html.push_str(rest);
}
