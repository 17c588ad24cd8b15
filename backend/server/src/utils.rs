use axum::body::Bytes;
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;

use crate::{error::AppError, logs::LogQuery};

pub fn parse_body<T: DeserializeOwned>(body: Bytes) -> Result<T, AppError> {
    serde_json::from_slice(&body).map_err(|_| AppError::MalformedPayload)
}

/// Raw `/api/logs` query string. Every value stays a string so a bad number
/// or a repeated key never rejects the request.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LogParams {
    pub level: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

impl LogParams {
    /// The first occurrence of each key wins; unknown keys are ignored.
    pub fn from_query(raw: Option<&str>) -> Self {
        let mut params = Self::default();

        for pair in raw.unwrap_or_default().split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let slot = match decode_component(key).as_str() {
                "level" => &mut params.level,
                "limit" => &mut params.limit,
                "page" => &mut params.page,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(decode_component(value));
            }
        }

        params
    }

    pub fn into_query(self) -> LogQuery {
        LogQuery {
            level: self.level.filter(|level| !level.is_empty()),
            limit: self
                .limit
                .as_deref()
                .and_then(parse_int)
                .and_then(|limit| usize::try_from(limit).ok())
                .filter(|limit| *limit > 0),
            page: self.page.as_deref().and_then(parse_int),
        }
    }
}

fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    percent_decode_str(&raw).decode_utf8_lossy().into_owned()
}

// leading sign and digits only, so `5abc` reads as 5 and `2.0` as 2
fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let unsigned = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let sign = raw.len() - unsigned.len();

    raw[..sign + digits].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(level: Option<&str>, limit: Option<&str>, page: Option<&str>) -> LogParams {
        LogParams {
            level: level.map(String::from),
            limit: limit.map(String::from),
            page: page.map(String::from),
        }
    }

    #[test]
    fn test_valid_params() {
        let query = params(Some("warn"), Some("5"), Some("2")).into_query();

        assert_eq!(query.level.as_deref(), Some("warn"));
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.page, Some(2));
    }

    #[test]
    fn test_invalid_numbers_are_absent() {
        let query = params(Some(""), Some("abc"), Some("two")).into_query();

        assert_eq!(query, LogQuery::default());
    }

    #[test]
    fn test_non_positive_limit_is_absent() {
        assert_eq!(params(None, Some("0"), None).into_query().limit, None);
        assert_eq!(params(None, Some("-3"), None).into_query().limit, None);
    }

    #[test]
    fn test_negative_page_kept_for_clamping() {
        assert_eq!(params(None, None, Some("-1")).into_query().page, Some(-1));
    }

    #[test]
    fn test_leading_digits_are_read() {
        let query = params(None, Some("5abc"), Some(" 2.0")).into_query();

        assert_eq!(query.limit, Some(5));
        assert_eq!(query.page, Some(2));
        assert_eq!(params(None, Some("-"), Some("+")).into_query(), LogQuery::default());
    }

    #[test]
    fn test_from_query_first_value_wins() {
        let parsed = LogParams::from_query(Some("page=1&page=2&level=warn&level=info"));

        assert_eq!(parsed, params(Some("warn"), None, Some("1")));
    }

    #[test]
    fn test_from_query_decodes_and_ignores_noise() {
        let parsed = LogParams::from_query(Some("lev%65l=a+b%26c&&limit&other=1&page=%ZZ"));

        assert_eq!(parsed, params(Some("a b&c"), Some(""), Some("%ZZ")));
        assert_eq!(LogParams::from_query(None), LogParams::default());
        assert_eq!(LogParams::from_query(Some("")), LogParams::default());
    }

    #[test]
    fn test_parse_body() {
        let parsed: serde_json::Value = parse_body(Bytes::from_static(b"{\"a\":1}")).unwrap();
        assert_eq!(parsed["a"], 1);

        let malformed = parse_body::<serde_json::Value>(Bytes::from_static(b"{oops"));
        assert!(matches!(malformed, Err(AppError::MalformedPayload)));
    }
}
