//! Response returned by a matched handler.

use bytes::Bytes;
use serde_json::Value;

/// Canned HTTP response produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl MockResponse {
    /// Empty `200 OK` response.
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new()
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Sets a header, replacing any previous value with the same (case-insensitive) name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Serializes `body` as JSON and sets `content-type: application/json`.
    pub fn with_json_body(self, body: &Value) -> Self {
        self.with_header("content-type", "application/json")
            .with_body(body.to_string())
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body text with line breaks, tabs and double spaces removed, for log lines.
    pub fn compact_body(&self) -> String {
        String::from_utf8_lossy(&self.body)
            .replace('\n', "")
            .replace('\r', "")
            .replace('\t', "")
            .replace("  ", "")
            .trim()
            .to_string()
    }
}

impl Default for MockResponse {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn test_default_is_empty_ok() {
        let response = MockResponse::default();
        assert_eq!(response.status(), 200);
        assert!(response.headers().is_empty());
        assert!(response.body().is_empty());
    }

    #[rstest]
    #[case(201)]
    #[case(404)]
    #[case(503)]
    fn test_with_status(#[case] status: u16) {
        assert_eq!(MockResponse::ok().with_status(status).status(), status);
    }

    #[rstest]
    fn test_with_header_replaces_same_name() {
        let response = MockResponse::ok()
            .with_header("Content-Type", "text/plain")
            .with_header("content-type", "application/json");
        assert_eq!(
            response.headers(),
            &[("content-type".to_string(), "application/json".to_string())]
        );
    }

    #[rstest]
    fn test_with_json_body() {
        let response = MockResponse::ok().with_json_body(&json!({"message": "success"}));
        assert_eq!(
            response.body(),
            &Bytes::from_static(br#"{"message":"success"}"#)
        );
        assert_eq!(
            response.headers()[0],
            ("content-type".to_string(), "application/json".to_string())
        );
    }

    #[rstest]
    #[case("{\n  \"a\": 1\n}", "{\"a\": 1}")]
    #[case("\t\tplain\t", "plain")]
    #[case("  padded  ", "padded")]
    #[case("", "")]
    fn test_compact_body(#[case] body: &'static str, #[case] expected: &str) {
        let response = MockResponse::ok().with_body(body);
        assert_eq!(response.compact_body(), expected);
    }
}
