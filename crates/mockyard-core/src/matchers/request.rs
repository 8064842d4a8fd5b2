//! Composite matcher built from a declarative stub.

use crate::dispatch::Match;
use crate::matching::{headers_matches, payload_matches, query_matches, PathPattern};
use crate::types::request::RecordedRequest;
use crate::types::stub::{MapOrExpression, PayloadOrExpression, StubDefinition};
use http::Method;
use std::collections::HashMap;

/// Matcher combining method, URL pattern, path params, headers, query and payload.
///
/// Unset parts accept anything. Parts are checked in order of cost: method,
/// URL, params, headers, query, then the body.
#[derive(Debug, Clone, Default)]
pub struct RequestMatcher {
    pub method: Option<Method>,
    pub url: Option<PathPattern>,
    pub params: Option<HashMap<String, String>>,
    pub headers: Option<MapOrExpression>,
    pub query: Option<MapOrExpression>,
    pub payload: Option<PayloadOrExpression>,
}

impl RequestMatcher {
    fn params_match(&self, actual: &HashMap<String, String>) -> bool {
        self.params.as_ref().map_or(true, |expected| {
            expected
                .iter()
                .all(|(key, value)| actual.get(key) == Some(value))
        })
    }
}

impl From<&StubDefinition> for RequestMatcher {
    fn from(stub: &StubDefinition) -> Self {
        Self {
            method: stub.method.map(|m| m.as_method()),
            url: Some(PathPattern::new(stub.url.as_str())),
            params: stub.params.clone(),
            headers: stub.headers.clone(),
            query: stub.query.clone(),
            payload: stub.payload.clone(),
        }
    }
}

impl Match for RequestMatcher {
    fn matches(&self, request: &RecordedRequest) -> bool {
        if self.method.as_ref().is_some_and(|m| *m != request.method) {
            return false;
        }

        if let Some(url) = &self.url {
            match url.captures(&request.path) {
                Some(params) if self.params_match(&params) => {}
                _ => return false,
            }
        } else if self.params.is_some() {
            // Params only make sense against a URL pattern
            return false;
        }

        if !headers_matches(self.headers.as_ref(), &request.headers_map()) {
            return false;
        }

        if !query_matches(self.query.as_ref(), &request.query()) {
            return false;
        }

        // Skip body parsing when no payload is expected
        self.payload.is_none()
            || payload_matches(self.payload.as_ref(), request.body_json().as_ref())
    }
}
