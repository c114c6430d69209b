//! Response composition: turning a handler's result into a wire response
//! shaped by the operation's declared response definitions.

use crate::error::{Error, Result};
use crate::response::{ComposedResponse, HandlerResult};
use crate::spec::Operation;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Compose a handler result into a finished response.
///
/// Looks up the operation's response definition for the result's status
/// (falling back to the spec's `default` response) and fails with
/// [`Error::UndeclaredStatus`] when neither exists. A definition with
/// declared content serializes the payload to JSON; one without emits an
/// empty body and empty content type regardless of the payload.
///
/// Headers declared in the response definition with a schema default are
/// merged in without overriding anything the handler set. Composing the same
/// result twice yields byte-identical output.
pub fn compose(operation: &Operation, result: &HandlerResult) -> Result<ComposedResponse> {
    let definition =
        operation
            .response_for(result.status)
            .ok_or_else(|| Error::UndeclaredStatus {
                operation_id: operation.operation_id.clone(),
                status: result.status,
            })?;

    let mut headers: HashMap<String, String> = result.headers.clone();
    for declared in &definition.headers {
        if let Some(default) = &declared.default {
            let already_set = headers
                .keys()
                .any(|k| k.eq_ignore_ascii_case(&declared.name));
            if !already_set {
                headers.insert(declared.name.clone(), render_header_value(default));
            }
        }
    }

    let (body, content_type) = if definition.has_content {
        let value = result.payload.to_value();
        (
            value.to_string().into_bytes(),
            "application/json".to_string(),
        )
    } else {
        (Vec::new(), String::new())
    };

    debug!(
        operation_id = %operation.operation_id,
        status = result.status,
        body_bytes = body.len(),
        content_type = %content_type,
        "Response composed"
    );

    Ok(ComposedResponse {
        status: result.status,
        headers,
        body,
        content_type,
    })
}

fn render_header_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
