use crate::encode::Payload;
use serde::Serialize;
use std::collections::HashMap;

/// The value a handler returns for one request: one explicit shape with
/// defaults instead of overloaded tuple forms. A bare payload is status 200;
/// intentional non-200 responses (201, 404, 204, …) set `status` explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResult {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub payload: Payload,
}

impl Default for HandlerResult {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            payload: Payload::Null,
        }
    }
}

impl HandlerResult {
    /// Status 200 with the given payload.
    pub fn ok(payload: impl Into<Payload>) -> Self {
        Self {
            payload: payload.into(),
            ..Default::default()
        }
    }

    /// The given status with an empty payload.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// The given status and payload.
    pub fn with_status(status: u16, payload: impl Into<Payload>) -> Self {
        Self {
            status,
            payload: payload.into(),
            ..Default::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl<T: Into<Payload>> From<T> for HandlerResult {
    fn from(payload: T) -> Self {
        HandlerResult::ok(payload)
    }
}

/// A finished response ready for the host transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// Empty when the response declares no content.
    pub content_type: String,
}

impl ComposedResponse {
    pub fn json_body(&self) -> Option<serde_json::Value> {
        if self.content_type == "application/json" {
            serde_json::from_slice(&self.body).ok()
        } else {
            None
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: u16,
    message: &'a str,
}

/// The error payload contract: every failed request yields JSON
/// `{"code": <status>, "message": <string>}` with the matching HTTP status.
pub fn error_response(status: u16, message: &str) -> ComposedResponse {
    let body = ErrorBody {
        code: status,
        message,
    };
    ComposedResponse {
        status,
        headers: HashMap::new(),
        body: serde_json::to_string(&body)
            .unwrap_or_else(|_| format!("{{\"code\":{status},\"message\":\"error\"}}"))
            .into_bytes(),
        content_type: "application/json".to_string(),
    }
}
