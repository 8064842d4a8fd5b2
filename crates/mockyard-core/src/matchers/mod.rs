//! Ready-made [`Match`] implementations.
//!
//! ```ignore
//! use mockyard_core::matchers::{method, path, MatchExt};
//!
//! registry.register(method(Method::POST).and(path("/orders")), MockResponse::ok());
//! ```

mod request;

pub use request::RequestMatcher;

use crate::dispatch::Match;
use crate::expression::match_with_jmespath;
use crate::matching::{hashmap_intersects, object_intersects, PathPattern};
use crate::types::request::RecordedRequest;
use http::Method;
use serde_json::Value;
use std::collections::HashMap;

/// Matches every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyMatcher;

pub fn any() -> AnyMatcher {
    AnyMatcher
}

impl Match for AnyMatcher {
    fn matches(&self, _request: &RecordedRequest) -> bool {
        true
    }
}

/// Exact match on the request target, query string included.
#[derive(Debug, Clone)]
pub struct PathMatcher(String);

pub fn path(path: impl Into<String>) -> PathMatcher {
    PathMatcher(path.into())
}

impl Match for PathMatcher {
    fn matches(&self, request: &RecordedRequest) -> bool {
        request.path == self.0
    }
}

/// Path match with `{param}` placeholders.
#[derive(Debug, Clone)]
pub struct PathPatternMatcher(PathPattern);

pub fn path_pattern(pattern: impl Into<String>) -> PathPatternMatcher {
    PathPatternMatcher(PathPattern::new(pattern))
}

impl Match for PathPatternMatcher {
    fn matches(&self, request: &RecordedRequest) -> bool {
        self.0.is_match(&request.path)
    }
}

#[derive(Debug, Clone)]
pub struct MethodMatcher(Method);

pub fn method(method: Method) -> MethodMatcher {
    MethodMatcher(method)
}

impl Match for MethodMatcher {
    fn matches(&self, request: &RecordedRequest) -> bool {
        request.method == self.0
    }
}

/// Header value match. Names compare case-insensitively; repeated headers
/// match if any of their values equals the expected one.
#[derive(Debug, Clone)]
pub struct HeaderMatcher {
    name: String,
    value: String,
}

pub fn header(name: impl Into<String>, value: impl Into<String>) -> HeaderMatcher {
    HeaderMatcher {
        name: name.into(),
        value: value.into(),
    }
}

impl Match for HeaderMatcher {
    fn matches(&self, request: &RecordedRequest) -> bool {
        request
            .headers
            .iter()
            .any(|(k, v)| k.eq_ignore_ascii_case(&self.name) && *v == self.value)
    }
}

#[derive(Debug, Clone)]
pub struct QueryParamMatcher {
    key: String,
    value: String,
}

pub fn query_param(key: impl Into<String>, value: impl Into<String>) -> QueryParamMatcher {
    QueryParamMatcher {
        key: key.into(),
        value: value.into(),
    }
}

impl Match for QueryParamMatcher {
    fn matches(&self, request: &RecordedRequest) -> bool {
        let expected = HashMap::from([(self.key.clone(), self.value.clone())]);
        hashmap_intersects(Some(&expected), Some(&request.query()))
    }
}

/// JSON body containing the given value as a deep subset.
#[derive(Debug, Clone)]
pub struct BodyJsonSubsetMatcher(Value);

pub fn body_json_subset(subset: Value) -> BodyJsonSubsetMatcher {
    BodyJsonSubsetMatcher(subset)
}

impl Match for BodyJsonSubsetMatcher {
    fn matches(&self, request: &RecordedRequest) -> bool {
        object_intersects(request.body_json().as_ref(), Some(&self.0))
    }
}

/// JSON body for which the JMESPath expression evaluates to a truthy value.
#[derive(Debug, Clone)]
pub struct BodyExpressionMatcher(String);

pub fn body_expression(expression: impl Into<String>) -> BodyExpressionMatcher {
    BodyExpressionMatcher(expression.into())
}

impl Match for BodyExpressionMatcher {
    fn matches(&self, request: &RecordedRequest) -> bool {
        request
            .body_json()
            .is_some_and(|body| match_with_jmespath(&self.0, &body))
    }
}

/// Both matchers must accept the request.
#[derive(Debug, Clone)]
pub struct And<A, B>(A, B);

impl<A: Match, B: Match> Match for And<A, B> {
    fn matches(&self, request: &RecordedRequest) -> bool {
        self.0.matches(request) && self.1.matches(request)
    }
}

pub trait MatchExt: Match + Sized {
    fn and<M: Match>(self, other: M) -> And<Self, M> {
        And(self, other)
    }
}

impl<T: Match + Sized> MatchExt for T {}
