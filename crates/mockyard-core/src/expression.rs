//! JMESPath expression utilities for request matching.

use jmespath::Variable;
use serde_json::Value;
use std::rc::Rc;

/// Return the inner expression of a `${...}` string, or `None` for plain strings.
pub fn extract_expression(s: &str) -> Option<&str> {
    s.trim()
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .map(str::trim)
        .filter(|expr| !expr.is_empty())
}

/// Convert serde_json::Value to jmespath::Variable.
pub fn value_to_variable(value: &Value) -> Rc<Variable> {
    match value {
        Value::Null => Rc::new(Variable::Null),
        Value::Bool(b) => Rc::new(Variable::Bool(*b)),
        Value::Number(n) => Rc::new(Variable::Number(n.clone())),
        Value::String(s) => Rc::new(Variable::String(s.clone())),
        Value::Array(arr) => Rc::new(Variable::Array(
            arr.iter().map(value_to_variable).collect(),
        )),
        Value::Object(obj) => Rc::new(Variable::Object(
            obj.iter()
                .map(|(k, v)| (k.clone(), value_to_variable(v)))
                .collect(),
        )),
    }
}

/// Truthiness of a JMESPath search result.
///
/// Expression references never come out of a search over plain data and count as false.
pub fn variable_is_truthy(var: &Variable) -> bool {
    match var {
        Variable::Bool(b) => *b,
        Variable::Null => false,
        Variable::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Variable::String(s) => !s.is_empty(),
        Variable::Array(a) => !a.is_empty(),
        Variable::Object(o) => !o.is_empty(),
        Variable::Expref(_) => false,
    }
}

/// Match data using JMESPath expression.
///
/// Invalid expressions and evaluation errors count as "no match" and are logged at debug.
pub fn match_with_jmespath(expression: &str, data: &Value) -> bool {
    let expr = match jmespath::compile(expression) {
        Ok(expr) => expr,
        Err(err) => {
            tracing::debug!(expression, error = %err, "invalid jmespath expression");
            return false;
        }
    };

    let data_var = value_to_variable(data);
    match expr.search(&data_var) {
        Ok(result) => variable_is_truthy(&result),
        Err(err) => {
            tracing::debug!(expression, error = %err, "jmespath evaluation failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("${a == b}", Some("a == b"))]
    #[case("  ${ value }  ", Some("value"))]
    #[case("${}", None)]
    #[case("plain", None)]
    #[case("${unterminated", None)]
    fn test_extract_expression(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_expression(input), expected);
    }

    #[rstest]
    fn test_value_to_variable_nested() {
        let var = value_to_variable(&json!({"items": [1, null, true]}));
        let Variable::Object(map) = var.as_ref() else {
            panic!("expected object");
        };
        let Variable::Array(items) = map["items"].as_ref() else {
            panic!("expected array");
        };
        assert_eq!(items.len(), 3);
        assert!(matches!(*items[1], Variable::Null));
        assert!(matches!(*items[2], Variable::Bool(true)));
    }

    #[rstest]
    #[case(json!(true), true)]
    #[case(json!(false), false)]
    #[case(json!(null), false)]
    #[case(json!(0), false)]
    #[case(json!(-1), true)]
    #[case(json!(""), false)]
    #[case(json!("test"), true)]
    #[case(json!([]), false)]
    #[case(json!([1, 2]), true)]
    #[case(json!({}), false)]
    #[case(json!({"key": "value"}), true)]
    fn test_variable_is_truthy(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(variable_is_truthy(&value_to_variable(&value)), expected);
    }

    #[rstest]
    #[case("value > `3`", true)]
    #[case("value > `10`", false)]
    #[case("contains(items[*].id, `2`)", true)]
    #[case("length(items[?id > `5`]) > `0`", false)]
    #[case("[invalid", false)]
    #[case("missing", false)]
    fn test_match_with_jmespath(#[case] expression: &str, #[case] expected: bool) {
        let data = json!({"value": 5, "items": [{"id": 1}, {"id": 2}]});
        assert_eq!(match_with_jmespath(expression, &data), expected);
    }
}
