//! Path patterns with `{param}` placeholders.

use regex::Regex;
use std::collections::HashMap;

/// A compiled path pattern such as `/api/users/{id}/posts/{post}`.
///
/// Each placeholder captures one non-empty path segment. Query strings and
/// trailing slashes are ignored on both the pattern and the matched path.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Option<Regex>,
    params: Vec<String>,
}

impl PathPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        let source = pattern.into();
        let (regex_str, params) = build_regex(&normalize_path(&source));
        let regex = match Regex::new(&regex_str) {
            Ok(regex) => Some(regex),
            Err(err) => {
                tracing::debug!(pattern = %source, error = %err, "path pattern never matches");
                None
            }
        };
        Self {
            source,
            regex,
            params,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder values when `path` matches, `None` otherwise.
    pub fn captures(&self, path: &str) -> Option<HashMap<String, String>> {
        let caps = self.regex.as_ref()?.captures(&normalize_path(path))?;
        Some(
            self.params
                .iter()
                .zip(caps.iter().skip(1))
                .filter_map(|(name, value)| Some((name.clone(), value?.as_str().to_owned())))
                .collect(),
        )
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.captures(path).is_some()
    }
}

/// One-off match of `path` against `pattern`, returning the placeholder values.
pub fn url_matches(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    PathPattern::new(pattern).captures(path)
}

fn normalize_path(path: &str) -> &str {
    let without_query = path.split_once('?').map_or(path, |(path, _)| path);
    match without_query.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

fn build_regex(pattern: &str) -> (String, Vec<String>) {
    let mut regex_str = String::from("^");
    let mut params = Vec::new();
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        regex_str.push_str(&regex::escape(&rest[..open]));
        let after = &rest[open + 1..];
        let close = after.find('}').unwrap_or(after.len());
        params.push(after[..close].to_string());
        regex_str.push_str("([^/]+)");
        rest = after.get(close + 1..).unwrap_or_default();
    }
    regex_str.push_str(&regex::escape(rest));
    regex_str.push_str("/?$");

    (regex_str, params)
}
