use http::Method;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl std::fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterLocation::Path => write!(f, "path"),
            ParameterLocation::Query => write!(f, "query"),
            ParameterLocation::Header => write!(f, "header"),
            ParameterLocation::Cookie => write!(f, "cookie"),
        }
    }
}

impl From<oas3::spec::ParameterIn> for ParameterLocation {
    fn from(loc: oas3::spec::ParameterIn) -> Self {
        match loc {
            oas3::spec::ParameterIn::Path => ParameterLocation::Path,
            oas3::spec::ParameterIn::Query => ParameterLocation::Query,
            oas3::spec::ParameterIn::Header => ParameterLocation::Header,
            oas3::spec::ParameterIn::Cookie => ParameterLocation::Cookie,
        }
    }
}

/// Metadata for one declared operation parameter.
#[derive(Debug, Clone)]
pub struct ParameterMeta {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub schema: Option<Value>,
}

/// A response header declared in the spec for one status code.
///
/// `default` is the header schema's `default` value, rendered into the
/// response when the handler did not set the header itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseHeader {
    pub name: String,
    pub default: Option<Value>,
}

/// The spec-declared shape of a response for one status code.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDefinition {
    /// JSON schema for the `application/json` content, if declared.
    pub schema: Option<Value>,
    /// Headers declared for this response.
    pub headers: Vec<ResponseHeader>,
    /// Whether the response declares any content at all. A response without
    /// content is serialized as an empty body with an empty content type.
    pub has_content: bool,
}

/// One (path, HTTP method) pair from the OpenAPI document, identified by its
/// unique operation id. Derived at load time and never mutated.
#[derive(Debug, Clone)]
pub struct Operation {
    pub operation_id: String,
    pub method: Method,
    /// Path template with `{name}` placeholders, e.g. `/pets/{pet_id}`.
    pub path_pattern: String,
    pub parameters: Vec<ParameterMeta>,
    pub request_schema: Option<Value>,
    pub request_body_required: bool,
    /// Response definitions keyed by status code string, plus `default` when
    /// the spec declares one.
    pub responses: HashMap<String, ResponseDefinition>,
}

impl Operation {
    /// Look up the response definition for a status code, falling back to the
    /// spec's `default` response when no exact match is declared.
    pub fn response_for(&self, status: u16) -> Option<&ResponseDefinition> {
        self.responses
            .get(&status.to_string())
            .or_else(|| self.responses.get("default"))
    }
}
