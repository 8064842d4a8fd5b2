//! Immutable snapshot of a request received by the mock server.

use crate::matching::parse_query_string;
use bytes::Bytes;
use http::Method;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// A request as seen by the mock server.
///
/// The body is read from the connection exactly once, when the request is
/// captured, so matchers and diagnostics can inspect it as often as they like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// HTTP method
    pub method: Method,
    /// Path including the query string, as sent on the request line
    pub path: String,
    /// Headers in the order they were received
    pub headers: Vec<(String, String)>,
    /// Request body
    pub body: Bytes,
    /// Zero-based position among all requests received by the server
    pub sequence_number: usize,
}

impl RecordedRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Bytes::new(),
            sequence_number: 0,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_sequence_number(mut self, sequence_number: usize) -> Self {
        self.sequence_number = sequence_number;
        self
    }

    /// Path without the query string.
    pub fn path_only(&self) -> &str {
        self.path.split('?').next().unwrap_or_default()
    }

    /// Decoded query parameters. Repeated keys are joined with a comma.
    pub fn query(&self) -> HashMap<String, String> {
        self.path
            .split_once('?')
            .map(|(_, query)| parse_query_string(query))
            .unwrap_or_default()
    }

    /// First value of a header, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Headers keyed by lowercase name. Repeated headers are joined with a comma.
    pub fn headers_map(&self) -> HashMap<String, String> {
        let mut result: HashMap<String, String> = HashMap::new();
        for (name, value) in &self.headers {
            result
                .entry(name.to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(value);
                })
                .or_insert_with(|| value.clone());
        }
        result
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Body parsed as JSON, `None` if empty or not valid JSON.
    pub fn body_json(&self) -> Option<Value> {
        if self.body.is_empty() {
            return None;
        }
        serde_json::from_slice(&self.body).ok()
    }
}

impl fmt::Display for RecordedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("/api/users", "/api/users")]
    #[case("/api/users?page=1", "/api/users")]
    #[case("/?a=b", "/")]
    #[case("", "")]
    fn test_path_only(#[case] path: &str, #[case] expected: &str) {
        let request = RecordedRequest::new(Method::GET, path);
        assert_eq!(request.path_only(), expected);
    }

    #[rstest]
    fn test_query_is_decoded() {
        let request = RecordedRequest::new(Method::GET, "/search?q=hello%20world&tag=a&tag=b");
        let query = request.query();
        assert_eq!(query.get("q"), Some(&"hello world".to_string()));
        assert_eq!(query.get("tag"), Some(&"a,b".to_string()));
    }

    #[rstest]
    fn test_query_empty_without_question_mark() {
        let request = RecordedRequest::new(Method::GET, "/search");
        assert!(request.query().is_empty());
    }

    #[rstest]
    #[case("content-type")]
    #[case("Content-Type")]
    #[case("CONTENT-TYPE")]
    fn test_header_lookup_is_case_insensitive(#[case] name: &str) {
        let request =
            RecordedRequest::new(Method::POST, "/").with_header("Content-Type", "application/json");
        assert_eq!(request.header(name), Some("application/json"));
    }

    #[rstest]
    fn test_headers_map_joins_repeated_headers() {
        let request = RecordedRequest::new(Method::GET, "/")
            .with_header("Accept", "text/html")
            .with_header("accept", "application/json");
        let map = request.headers_map();
        assert_eq!(
            map.get("accept"),
            Some(&"text/html,application/json".to_string())
        );
    }

    #[rstest]
    fn test_body_json() {
        let request = RecordedRequest::new(Method::POST, "/").with_body(r#"{"id": 5}"#);
        assert_eq!(request.body_json(), Some(json!({"id": 5})));
        assert_eq!(request.body_text(), r#"{"id": 5}"#);
    }

    #[rstest]
    #[case("")]
    #[case("not json")]
    fn test_body_json_none_for_non_json(#[case] body: &'static str) {
        let request = RecordedRequest::new(Method::POST, "/").with_body(body);
        assert_eq!(request.body_json(), None);
    }

    #[rstest]
    fn test_display() {
        let request = RecordedRequest::new(Method::DELETE, "/api/users/1?force=true");
        assert_eq!(request.to_string(), "DELETE /api/users/1?force=true");
    }
}
