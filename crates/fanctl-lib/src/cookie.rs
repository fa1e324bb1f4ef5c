//! `Set-Cookie` scanning for BMC session identifiers

use reqwest::header::{HeaderMap, SET_COOKIE};
use std::collections::BTreeMap;

/// Cookie names BMC firmwares use for the web session
pub const SESSION_COOKIE_NAMES: &[&str] = &["SESSION", "QSESSIONID"];

/// Split a raw cookie header value into `name -> value` pairs.
///
/// Segments without `=` (`HttpOnly`, `Secure`) are skipped. The value keeps
/// any further `=` characters. The first occurrence of a name wins.
pub fn parse_cookie_header(raw: &str) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();

    for segment in raw.split(';') {
        let segment = segment.trim();
        let Some((name, value)) = segment.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        cookies
            .entry(name.to_string())
            .or_insert_with(|| value.trim().to_string());
    }

    cookies
}

/// Find the session id in a response's `Set-Cookie` headers.
///
/// Headers are scanned in order; within one header `SESSION` takes
/// precedence over `QSESSIONID`.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|raw| {
            let cookies = parse_cookie_header(raw);
            SESSION_COOKIE_NAMES
                .iter()
                .filter_map(|name| cookies.get(*name))
                .find(|value| !value.is_empty())
                .cloned()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_parse_cookie_header() {
        let cookies = parse_cookie_header("QSESSIONID=abc123; path=/; HttpOnly; Secure");
        assert_eq!(cookies.get("QSESSIONID").map(String::as_str), Some("abc123"));
        assert_eq!(cookies.get("path").map(String::as_str), Some("/"));
        assert!(!cookies.contains_key("HttpOnly"));
        assert_eq!(cookies.len(), 2);
    }

    #[test]
    fn test_parse_keeps_embedded_equals_and_first_value() {
        let cookies = parse_cookie_header("token=a=b==; token=second");
        assert_eq!(cookies.get("token").map(String::as_str), Some("a=b=="));
    }

    #[test]
    fn test_parse_empty_and_garbage() {
        assert!(parse_cookie_header("").is_empty());
        assert!(parse_cookie_header(" ; ;=orphan").is_empty());
    }

    #[test]
    fn test_session_id_either_name() {
        let mut headers = HeaderMap::new();
        headers.insert(SET_COOKIE, HeaderValue::from_static("SESSION=s-1; path=/"));
        assert_eq!(session_id(&headers).as_deref(), Some("s-1"));

        let mut headers = HeaderMap::new();
        headers.insert(
            SET_COOKIE,
            HeaderValue::from_static("lang=en; QSESSIONID=q-2; HttpOnly"),
        );
        assert_eq!(session_id(&headers).as_deref(), Some("q-2"));
    }

    #[test]
    fn test_session_id_scans_every_set_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("lang=en; path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("QSESSIONID=late; path=/"));
        assert_eq!(session_id(&headers).as_deref(), Some("late"));
    }

    #[test]
    fn test_session_id_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(SET_COOKIE, HeaderValue::from_static("JSESSIONID=x; path=/"));
        assert_eq!(session_id(&headers), None);
        assert_eq!(session_id(&HeaderMap::new()), None);
    }
}
