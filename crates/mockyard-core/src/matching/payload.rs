//! Request body matching: JSON subset or JMESPath expression.

use crate::expression::match_with_jmespath;
use crate::matching::intersection::object_intersects;
use crate::types::stub::PayloadOrExpression;
use serde_json::Value;

/// Match a parsed request body.
///
/// `None` for `actual` means the body was empty or not JSON; it only matches
/// when no payload is expected.
pub fn payload_matches(expected: Option<&PayloadOrExpression>, actual: Option<&Value>) -> bool {
    match (expected, actual) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(PayloadOrExpression::Expression(expr)), Some(body)) => {
            match_with_jmespath(expr, body)
        }
        (Some(PayloadOrExpression::Value(subset)), Some(body)) => {
            object_intersects(Some(body), Some(subset))
        }
    }
}
