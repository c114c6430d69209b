//! Parameter binding: mapping a validated request onto a handler signature.
//!
//! Signatures are declared statically at registration time instead of being
//! discovered through runtime reflection, so a signature that can never be
//! satisfied by its operation is visible at startup rather than mid-request.

use crate::error::{Error, Result};
use crate::request::BoundRequest;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// One declared handler parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    /// Required parameters have no default and are passed positionally;
    /// optional ones go into the keyword mapping.
    pub required: bool,
}

/// A handler's declared parameter list, in call order, plus the name of its
/// body parameter if it has one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerSignature {
    pub params: Vec<ParamSpec>,
    pub body_param: Option<String>,
}

impl HandlerSignature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required parameter (no default value).
    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            required: true,
        });
        self
    }

    /// Declare an optional parameter (has a default value).
    pub fn optional(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            required: false,
        });
        self
    }

    /// Name the parameter that receives the validated request body.
    pub fn body(mut self, name: impl Into<String>) -> Self {
        self.body_param = Some(name.into());
        self
    }
}

/// Ordered positional arguments and keyword arguments ready for invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    pub args: Vec<Value>,
    pub kwargs: HashMap<String, Value>,
}

/// Map a validated request onto a handler signature.
///
/// Path and query parameters are merged into one name→value mapping (path
/// wins on collision, since the path is matched first). The validated body is
/// inserted under the declared body-parameter name; if no body name was
/// declared and exactly one signature parameter remains unmatched, the body
/// binds to it. Request parameters the signature does not consume are a
/// spec/signature mismatch: logged and dropped by default, a validation
/// error under `strict`.
///
/// Fails with [`Error::MissingRequiredParameter`] when a required parameter
/// remains unbound.
pub fn bind(
    signature: &HandlerSignature,
    request: &BoundRequest,
    strict: bool,
) -> Result<BoundArgs> {
    let mut merged: HashMap<String, Value> = HashMap::new();
    merged.extend(
        request
            .query_params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );
    merged.extend(
        request
            .path_params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );

    if let (Some(body_name), Some(body)) = (&signature.body_param, &request.body) {
        merged.insert(body_name.clone(), body.clone());
    }

    let mut bound = BoundArgs::default();
    let mut unmatched: Vec<&ParamSpec> = Vec::new();

    for param in &signature.params {
        match merged.remove(&param.name) {
            Some(value) => {
                if param.required {
                    bound.args.push(value);
                } else {
                    bound.kwargs.insert(param.name.clone(), value);
                }
            }
            None => unmatched.push(param),
        }
    }

    // A body with no declared name binds to the single remaining parameter.
    if unmatched.len() == 1 && signature.body_param.is_none() {
        if let Some(body) = &request.body {
            let param = unmatched.remove(0);
            if param.required {
                bound.args.push(body.clone());
            } else {
                bound.kwargs.insert(param.name.clone(), body.clone());
            }
        }
    }

    for param in unmatched {
        if param.required {
            return Err(Error::MissingRequiredParameter(param.name.clone()));
        }
    }

    if !merged.is_empty() {
        let leftover: Vec<&String> = merged.keys().collect();
        if strict {
            return Err(Error::validation(
                leftover
                    .iter()
                    .map(|name| format!("request parameter `{name}` is not consumed by the handler"))
                    .collect(),
            ));
        }
        warn!(
            leftover = ?leftover,
            "Request parameters not consumed by handler signature"
        );
    }

    Ok(bound)
}
