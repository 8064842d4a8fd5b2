//! Header matching (case-insensitive names) and JMESPath expressions.

use crate::expression::match_with_jmespath;
use crate::matching::intersection::{hashmap_intersects, hashmap_to_value};
use crate::types::stub::MapOrExpression;
use std::collections::HashMap;

fn lowercase_keys(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
        .collect()
}

/// Match request headers against a literal map or a JMESPath expression.
///
/// Header names are lowercased on both sides; expressions see lowercase keys.
pub fn headers_matches(
    expected: Option<&MapOrExpression>,
    actual: &HashMap<String, String>,
) -> bool {
    let actual = lowercase_keys(actual);
    match expected {
        Some(MapOrExpression::Expression(expr)) => {
            match_with_jmespath(expr, &hashmap_to_value(&actual))
        }
        Some(MapOrExpression::Map(expected_map)) => {
            hashmap_intersects(Some(&lowercase_keys(expected_map)), Some(&actual))
        }
        None => true,
    }
}
