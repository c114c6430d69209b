use serde_json::Value;
use std::collections::HashMap;

/// A raw HTTP request handed over by the host transport.
///
/// The host's router has already resolved path-template variables; this crate
/// only validates and decodes them. Header keys are expected lowercase.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub method: http::Method,
    pub path: String,
    /// Path-template variables resolved by the host's router.
    pub path_params: HashMap<String, String>,
    /// Query string parameters.
    pub query_params: HashMap<String, String>,
    /// HTTP headers (lowercase keys).
    pub headers: HashMap<String, String>,
    /// Raw body bytes, if any.
    pub body: Option<Vec<u8>>,
}

impl RawRequest {
    pub fn new(method: http::Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// The outcome of validating a [`RawRequest`] against an operation's schema:
/// decoded path and query parameters plus the parsed JSON body, if any.
/// Created per request and discarded after response composition.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundRequest {
    pub path_params: HashMap<String, Value>,
    pub query_params: HashMap<String, Value>,
    pub body: Option<Value>,
}

/// Request metadata forwarded untouched to the invocation callback, so hosts
/// can propagate call context (correlation ids, auth principals) from headers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: http::Method,
    pub path: String,
    pub headers: HashMap<String, String>,
}

impl From<&RawRequest> for RequestContext {
    fn from(req: &RawRequest) -> Self {
        Self {
            method: req.method.clone(),
            path: req.path.clone(),
            headers: req.headers.clone(),
        }
    }
}

/// Parse query string parameters from a URL path.
///
/// Convenience for hosts that hand over the raw path; extracts everything
/// after the `?` and URL-decodes names and values.
pub fn parse_query_params(path: &str) -> HashMap<String, String> {
    if let Some(pos) = path.find('?') {
        let query_str = &path[pos + 1..];
        url::form_urlencoded::parse(query_str.as_bytes())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    } else {
        HashMap::new()
    }
}

/// Decode a raw parameter value into its schema-declared JSON type.
///
/// Values that fail to parse stay strings so the schema validator reports the
/// type mismatch instead of the decoder swallowing it.
pub fn decode_param_value(value: &str, schema: Option<&Value>) -> Value {
    fn convert_primitive(val: &str, schema: Option<&Value>) -> Value {
        if let Some(ty) = schema.and_then(|s| s.get("type").and_then(|v| v.as_str())) {
            match ty {
                "integer" => val
                    .parse::<i64>()
                    .map(Value::from)
                    .unwrap_or_else(|_| Value::String(val.to_string())),
                "number" => val
                    .parse::<f64>()
                    .map(Value::from)
                    .unwrap_or_else(|_| Value::String(val.to_string())),
                "boolean" => val
                    .parse::<bool>()
                    .map(Value::from)
                    .unwrap_or_else(|_| Value::String(val.to_string())),
                _ => Value::String(val.to_string()),
            }
        } else {
            Value::String(val.to_string())
        }
    }

    if let Some(ty) = schema.and_then(|s| s.get("type").and_then(|v| v.as_str())) {
        match ty {
            "array" => {
                let items_schema = schema.and_then(|s| s.get("items"));
                let parts = value
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(|p| convert_primitive(p.trim(), items_schema))
                    .collect::<Vec<_>>();
                Value::Array(parts)
            }
            "object" => serde_json::from_str(value).unwrap_or(Value::String(value.to_string())),
            _ => convert_primitive(value, schema),
        }
    } else {
        Value::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("/pets?limit=2&animal_type=cat");
        assert_eq!(q.get("limit"), Some(&"2".to_string()));
        assert_eq!(q.get("animal_type"), Some(&"cat".to_string()));
        assert!(parse_query_params("/pets").is_empty());
    }

    #[test]
    fn test_decode_integer() {
        let schema = json!({"type": "integer"});
        assert_eq!(decode_param_value("42", Some(&schema)), json!(42));
        // unparseable stays a string for the validator to flag
        assert_eq!(decode_param_value("nope", Some(&schema)), json!("nope"));
    }

    #[test]
    fn test_decode_boolean_and_number() {
        assert_eq!(
            decode_param_value("true", Some(&json!({"type": "boolean"}))),
            json!(true)
        );
        assert_eq!(
            decode_param_value("1.5", Some(&json!({"type": "number"}))),
            json!(1.5)
        );
    }

    #[test]
    fn test_decode_array_of_integers() {
        let schema = json!({"type": "array", "items": {"type": "integer"}});
        assert_eq!(
            decode_param_value("1,2,3", Some(&schema)),
            json!([1, 2, 3])
        );
    }

    #[test]
    fn test_decode_without_schema_is_string() {
        assert_eq!(decode_param_value("42", None), json!("42"));
    }

    #[test]
    fn test_header_keys_lowercased() {
        let req = RawRequest::new(http::Method::GET, "/pets").header("X-Request-Id", "abc");
        assert_eq!(req.headers.get("x-request-id"), Some(&"abc".to_string()));
    }
}
