//! Declarative stub definitions loaded from config files.

use crate::expression::extract_expression;
use crate::types::response::MockResponse;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;

/// HTTP method a stub is restricted to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_method(self) -> http::Method {
        match self {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Options => http::Method::OPTIONS,
        }
    }
}

/// String map (headers, query) given either literally or as a `${jmespath}` expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOrExpression {
    Map(HashMap<String, String>),
    Expression(String),
}

impl Serialize for MapOrExpression {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MapOrExpression::Map(map) => map.serialize(serializer),
            MapOrExpression::Expression(expr) => format!("${{{}}}", expr).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for MapOrExpression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::String(s) => extract_expression(&s)
                .map(|expr| MapOrExpression::Expression(expr.to_string()))
                .ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "expected an object or a ${{...}} expression, got string '{}'",
                        s
                    ))
                }),
            Value::Object(map) => {
                let mut result = HashMap::new();
                for (k, v) in map {
                    // Scalars are accepted and stringified so `page: 1` works in YAML
                    let v = match v {
                        Value::String(s) => s,
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        other => {
                            return Err(serde::de::Error::custom(format!(
                                "value for '{}' must be a scalar, got {}",
                                k, other
                            )))
                        }
                    };
                    result.insert(k, v);
                }
                Ok(MapOrExpression::Map(result))
            }
            _ => Err(serde::de::Error::custom(
                "expected an object or a ${...} expression",
            )),
        }
    }
}

/// Request body to match: a JSON subset or a `${jmespath}` expression
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadOrExpression {
    Value(Value),
    Expression(String),
}

impl Serialize for PayloadOrExpression {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PayloadOrExpression::Value(v) => v.serialize(serializer),
            PayloadOrExpression::Expression(expr) => format!("${{{}}}", expr).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for PayloadOrExpression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if let Value::String(s) = &value {
            if let Some(expr) = extract_expression(s) {
                return Ok(PayloadOrExpression::Expression(expr.to_string()));
            }
        }
        Ok(PayloadOrExpression::Value(value))
    }
}

/// Response part of a stub
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseDefinition {
    /// HTTP status code, 200 when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    /// Strings are sent verbatim; any other JSON value is sent as `application/json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ResponseDefinition {
    pub fn to_response(&self) -> MockResponse {
        let mut response = MockResponse::new().with_status(self.status.unwrap_or(200));
        response = match &self.body {
            None => response,
            Some(Value::String(text)) => response.with_body(text.clone()),
            Some(json) => response.with_json_body(json),
        };
        if let Some(headers) = &self.headers {
            let mut names: Vec<&String> = headers.keys().collect();
            names.sort();
            for name in names {
                response = response.with_header(name.clone(), headers[name].clone());
            }
        }
        response
    }
}

/// A handler described in a stub file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StubDefinition {
    /// Identifier used in logs
    pub id: String,
    /// Method to match, any method when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    /// URL pattern (supports `{param}` placeholders)
    pub url: String,
    /// Expected values of URL placeholders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<MapOrExpression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<MapOrExpression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<PayloadOrExpression>,
    #[serde(default)]
    pub response: ResponseDefinition,
}
