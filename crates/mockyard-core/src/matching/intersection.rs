//! Subset checks for JSON values and string maps.

use serde_json::Value;
use std::collections::HashMap;

/// Check that `subset` is contained in `target`.
///
/// Objects are compared key by key, arrays by "every expected element has a
/// matching element", everything else by equality. A missing, null or empty
/// object subset matches any target.
pub fn object_intersects(target: Option<&Value>, subset: Option<&Value>) -> bool {
    match (subset, target) {
        (None | Some(Value::Null), _) => true,
        (Some(Value::Object(wanted)), _) if wanted.is_empty() => true,
        (Some(_), None | Some(Value::Null)) => false,
        (Some(wanted), Some(actual)) => is_subset(wanted, actual),
    }
}

fn is_subset(wanted: &Value, actual: &Value) -> bool {
    match (wanted, actual) {
        (Value::Object(wanted), Value::Object(actual)) => wanted.iter().all(|(key, value)| {
            actual
                .get(key)
                .is_some_and(|candidate| is_subset(value, candidate))
        }),
        (Value::Array(wanted), Value::Array(actual)) => wanted
            .iter()
            .all(|value| actual.iter().any(|candidate| is_subset(value, candidate))),
        _ => wanted == actual,
    }
}

/// Check that every expected key is present in `actual` with an overlapping value.
///
/// Values are comma-separated lists: `a,b` overlaps `b,c`.
pub fn hashmap_intersects(
    expected: Option<&HashMap<String, String>>,
    actual: Option<&HashMap<String, String>>,
) -> bool {
    let expected = match expected {
        None => return true,
        Some(e) if e.is_empty() => return true,
        Some(e) => e,
    };

    let Some(actual) = actual else {
        return false;
    };

    expected.iter().all(|(k, v)| {
        actual
            .get(k)
            .is_some_and(|actual_value| values_overlap(v, actual_value))
    })
}

fn values_overlap(expected: &str, actual: &str) -> bool {
    expected
        .split(',')
        .any(|ev| actual.split(',').any(|av| av.trim() == ev.trim()))
}

/// Convert a string map to a JSON object for JMESPath evaluation.
///
/// Comma-separated values become arrays so expressions like `contains(tags, 'a')` work.
pub fn hashmap_to_value(map: &HashMap<String, String>) -> Value {
    let object = map
        .iter()
        .map(|(key, value)| {
            let value = if value.contains(',') {
                Value::Array(
                    value
                        .split(',')
                        .map(|v| Value::String(v.trim().to_string()))
                        .collect(),
                )
            } else {
                Value::String(value.clone())
            };
            (key.clone(), value)
        })
        .collect();
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn h(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[rstest]
    #[case(Some(&json!({"id": 7})), None, true)]
    #[case(Some(&json!({"id": 7})), Some(&Value::Null), true)]
    #[case(Some(&json!([])), Some(&json!({})), true)]
    #[case(None, Some(&json!({"id": 7})), false)]
    #[case(Some(&Value::Null), Some(&json!("x")), false)]
    #[case(Some(&json!({"id": 7, "name": "Ann"})), Some(&json!({"name": "Ann"})), true)]
    #[case(Some(&json!({"id": 7})), Some(&json!({"id": "7"})), false)]
    #[case(Some(&json!({"order": {"total": 10, "lines": 2}})), Some(&json!({"order": {"total": 10}})), true)]
    #[case(Some(&json!({"lines": [{"sku": "a"}, {"sku": "b"}]})), Some(&json!({"lines": [{"sku": "b"}]})), true)]
    #[case(Some(&json!({"lines": [{"sku": "a"}]})), Some(&json!({"lines": [{"sku": "z"}]})), false)]
    #[case(Some(&json!({"lines": []})), Some(&json!({"lines": []})), true)]
    #[case(Some(&json!(42)), Some(&json!(42)), true)]
    fn test_object_intersects(
        #[case] target: Option<&Value>,
        #[case] subset: Option<&Value>,
        #[case] expected: bool,
    ) {
        assert_eq!(object_intersects(target, subset), expected);
    }

    #[rstest]
    #[case(None, None, true)]
    #[case(Some(&h(&[])), None, true)]
    #[case(Some(&h(&[("page", "1")])), None, false)]
    #[case(Some(&h(&[("page", "1")])), Some(&h(&[("page", "1"), ("limit", "10")])), true)]
    #[case(Some(&h(&[("page", "1")])), Some(&h(&[("page", "2")])), false)]
    #[case(Some(&h(&[("page", "1")])), Some(&h(&[("limit", "1")])), false)]
    #[case(Some(&h(&[("tags", "a,b")])), Some(&h(&[("tags", "b")])), true)]
    #[case(Some(&h(&[("tags", "a")])), Some(&h(&[("tags", "b, a")])), true)]
    #[case(Some(&h(&[("tags", "a,b")])), Some(&h(&[("tags", "c")])), false)]
    fn test_hashmap_intersects(
        #[case] expected: Option<&HashMap<String, String>>,
        #[case] actual: Option<&HashMap<String, String>>,
        #[case] result: bool,
    ) {
        assert_eq!(hashmap_intersects(expected, actual), result);
    }

    #[rstest]
    fn test_hashmap_to_value() {
        let value = hashmap_to_value(&h(&[("page", "1"), ("tags", "a, b")]));
        assert_eq!(value, json!({"page": "1", "tags": ["a", "b"]}));
    }
}
