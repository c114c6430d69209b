//! Request orchestration: validate → bind → invoke → compose.
//!
//! Each request moves through Received → Validated → Bound → Invoked →
//! Composed → Sent; a failure in any stage short-circuits to a JSON error
//! response `{"code", "message"}` with the matching HTTP status. Failures
//! never escape `dispatch`, so one broken request cannot take down the
//! host's serving loop.

use crate::binder::{bind, BoundArgs, HandlerSignature};
use crate::composer;
use crate::error::{Error, Result};
use crate::registry::SpecRegistry;
use crate::request::{RawRequest, RequestContext};
use crate::response::{error_response, ComposedResponse, HandlerResult};
use crate::runtime_config::RuntimeConfig;
use crate::spec::{Operation, ParameterLocation};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The seam to the host's worker/dispatch subsystem: receives the bound
/// arguments plus request metadata, and returns the handler's result. May
/// suspend the logical request while the host schedules the handler.
pub type Invoker =
    dyn Fn(BoundArgs, &RequestContext) -> Result<HandlerResult> + Send + Sync + 'static;

struct OperationBinding {
    operation: Arc<Operation>,
    signature: HandlerSignature,
    invoker: Arc<Invoker>,
}

/// Orchestrates request handling for the operations registered on it.
///
/// Holds only immutable state after setup, so one dispatcher can serve many
/// concurrent requests sharing one [`SpecRegistry`].
pub struct OperationDispatcher {
    registry: Arc<SpecRegistry>,
    config: RuntimeConfig,
    bindings: HashMap<String, OperationBinding>,
}

impl OperationDispatcher {
    /// Create a dispatcher with configuration from the environment.
    pub fn new(registry: Arc<SpecRegistry>) -> Self {
        Self::with_config(registry, RuntimeConfig::from_env())
    }

    pub fn with_config(registry: Arc<SpecRegistry>, config: RuntimeConfig) -> Self {
        Self {
            registry,
            config,
            bindings: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<SpecRegistry> {
        &self.registry
    }

    /// Bind a handler to an operation id.
    ///
    /// Fails with [`Error::UnknownOperation`] when the loaded spec declares
    /// no such operation — a static misconfiguration that should abort
    /// startup. Blocks until the spec is loaded. Signature parameters that
    /// can never be satisfied by the operation's declared parameters are
    /// logged at registration so the mismatch surfaces before traffic does.
    pub fn register<F>(
        &mut self,
        operation_id: &str,
        signature: HandlerSignature,
        invoker: F,
    ) -> Result<()>
    where
        F: Fn(BoundArgs, &RequestContext) -> Result<HandlerResult> + Send + Sync + 'static,
    {
        let operation = self.registry.get_operation(operation_id)?;
        warn_on_signature_mismatch(&operation, &signature);

        info!(
            operation_id = %operation_id,
            method = %operation.method,
            path = %operation.path_pattern,
            "Handler registered"
        );
        self.bindings.insert(
            operation_id.to_string(),
            OperationBinding {
                operation,
                signature,
                invoker: Arc::new(invoker),
            },
        );
        Ok(())
    }

    /// Handle one request end to end. Never fails: every error is mapped to
    /// a JSON error response.
    pub fn dispatch(&self, operation_id: &str, request: &RawRequest) -> ComposedResponse {
        let start = Instant::now();

        let binding = match self.bindings.get(operation_id) {
            Some(b) => b,
            None => {
                error!(operation_id = %operation_id, "No handler bound for operation");
                return error_response(500, "no handler bound for operation");
            }
        };
        let operation = &binding.operation;

        debug!(
            operation_id = %operation_id,
            method = %request.method,
            path = %request.path,
            "Request received"
        );

        // Received → Validated
        let bound_request = match self.registry.validate_request(operation, request) {
            Ok(br) => br,
            Err(e) => {
                warn!(operation_id = %operation_id, error = %e, "Request validation failed");
                return error_response(e.http_status(), &e.public_message());
            }
        };

        // Validated → Bound
        let args = match bind(&binding.signature, &bound_request, self.config.strict_params) {
            Ok(args) => args,
            Err(e) => {
                warn!(operation_id = %operation_id, error = %e, "Parameter binding failed");
                return error_response(e.http_status(), &e.public_message());
            }
        };

        // Bound → Invoked. The invoker may suspend while the host schedules
        // the handler; this blocks the logical request flow only.
        let ctx = RequestContext::from(request);
        let result = match (binding.invoker)(args, &ctx) {
            Ok(result) => result,
            Err(e) => {
                error!(operation_id = %operation_id, error = %e, "Handler failed");
                let e = if matches!(e, Error::Handler(_)) {
                    e
                } else {
                    Error::Handler(e.to_string())
                };
                return error_response(e.http_status(), &e.public_message());
            }
        };

        // Invoked → Composed
        let composed = match composer::compose(operation, &result) {
            Ok(resp) => resp,
            Err(e) => {
                error!(operation_id = %operation_id, error = %e, "Response composition failed");
                return error_response(e.http_status(), &e.public_message());
            }
        };

        if self.config.validate_responses && composed.content_type == "application/json" {
            if let Err(e) =
                self.registry
                    .validate_response(operation, result.status, &result.payload.to_value())
            {
                if self.config.enforce_responses {
                    error!(operation_id = %operation_id, error = %e, "Response validation failed");
                    return error_response(500, "response validation failed");
                }
                warn!(
                    operation_id = %operation_id,
                    error = %e,
                    "Response does not match declared schema, shipping anyway"
                );
            }
        }

        // Composed → Sent
        info!(
            operation_id = %operation_id,
            status = composed.status,
            latency_ms = start.elapsed().as_millis() as u64,
            "Request dispatched"
        );
        composed
    }
}

fn warn_on_signature_mismatch(operation: &Operation, signature: &HandlerSignature) {
    let declares_body = operation.request_schema.is_some();
    for param in &operation.parameters {
        if !param.required {
            continue;
        }
        if !matches!(
            param.location,
            ParameterLocation::Path | ParameterLocation::Query
        ) {
            continue;
        }
        let in_signature = signature.params.iter().any(|p| p.name == param.name);
        if !in_signature {
            warn!(
                operation_id = %operation.operation_id,
                parameter = %param.name,
                location = %param.location,
                "Required spec parameter has no matching handler parameter"
            );
        }
    }
    if signature.body_param.is_some() && !declares_body {
        warn!(
            operation_id = %operation.operation_id,
            "Handler declares a body parameter but the operation has no request body schema"
        );
    }
}
