//! Spec registry with a one-shot readiness gate.
//!
//! The registry holds exactly one [`Specification`], loaded from a file path
//! at startup. Loading is a one-shot event: the first successful `load` opens
//! the gate, every later `load` fails, and readers that arrive before the
//! gate opens block until it does. After the gate opens there is no further
//! synchronization; the specification is immutable and shared by reference.

use crate::error::{Error, Result};
use crate::request::{decode_param_value, BoundRequest, RawRequest};
use crate::spec::{load_specification, Operation, ParameterLocation, Specification};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Loads and holds one parsed OpenAPI document; resolves operation ids and
/// exposes request/response validation.
///
/// Safe to share across threads: many concurrent `dispatch` calls can read
/// one registry while (or after) a single loader populates it.
#[derive(Default)]
pub struct SpecRegistry {
    gate: OnceCell<Arc<Specification>>,
}

impl SpecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the specification from a YAML or JSON file and open the gate.
    ///
    /// Policy: a registry loads exactly once. A second call fails with
    /// [`Error::SpecLoad`] rather than silently replacing the document; a
    /// failed load leaves the gate closed so a retry is possible.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Arc<Specification>> {
        let spec = Arc::new(load_specification(path.as_ref())?);
        self.gate
            .set(Arc::clone(&spec))
            .map_err(|_| Error::SpecLoad("specification already loaded".to_string()))?;
        info!(slug = %spec.slug(), operations = spec.len(), "Spec registry ready");
        Ok(spec)
    }

    /// The loaded specification, blocking until `load` has completed.
    pub fn specification(&self) -> Arc<Specification> {
        Arc::clone(self.gate.wait())
    }

    /// The loaded specification, or `None` if the gate hasn't opened yet.
    pub fn try_specification(&self) -> Option<Arc<Specification>> {
        self.gate.get().cloned()
    }

    /// Resolve an operation id, blocking until the spec is loaded.
    pub fn get_operation(&self, operation_id: &str) -> Result<Arc<Operation>> {
        self.specification()
            .operation(operation_id)
            .cloned()
            .ok_or_else(|| Error::UnknownOperation(operation_id.to_string()))
    }

    /// Validate a raw request against an operation's schema and decode it
    /// into a [`BoundRequest`].
    ///
    /// Collects every violation (missing required parameters, parameter type
    /// mismatches, malformed or schema-violating body) before failing, so the
    /// caller can report complete diagnostics in one response.
    pub fn validate_request(
        &self,
        operation: &Operation,
        request: &RawRequest,
    ) -> Result<BoundRequest> {
        let spec = self.specification();
        let mut violations: Vec<String> = Vec::new();
        let mut path_params: HashMap<String, Value> = HashMap::new();
        let mut query_params: HashMap<String, Value> = HashMap::new();

        for param in &operation.parameters {
            let raw = match param.location {
                ParameterLocation::Path => request.path_params.get(&param.name),
                ParameterLocation::Query => request.query_params.get(&param.name),
                // Header and cookie parameters are not bound to handler
                // arguments; the host sees them through the request context.
                _ => continue,
            };

            let raw = match raw {
                Some(v) => v,
                None => {
                    if param.required {
                        violations.push(format!(
                            "missing required {} parameter `{}`",
                            param.location, param.name
                        ));
                    }
                    continue;
                }
            };

            let decoded = decode_param_value(raw, param.schema.as_ref());
            if let Some(validator) =
                spec.parameter_validator(&operation.operation_id, &param.name)
            {
                violations.extend(
                    validator
                        .iter_errors(&decoded)
                        .map(|e| format!("{} parameter `{}`: {e}", param.location, param.name)),
                );
            }

            match param.location {
                ParameterLocation::Path => path_params.insert(param.name.clone(), decoded),
                ParameterLocation::Query => query_params.insert(param.name.clone(), decoded),
                _ => None,
            };
        }

        let body = match request.body.as_deref() {
            Some(bytes) if !bytes.is_empty() => match serde_json::from_slice::<Value>(bytes) {
                Ok(value) => {
                    if let Some(validator) = spec.request_validator(&operation.operation_id) {
                        violations
                            .extend(validator.iter_errors(&value).map(|e| format!("body: {e}")));
                    }
                    Some(value)
                }
                Err(e) => {
                    violations.push(format!("body is not valid JSON: {e}"));
                    None
                }
            },
            _ => {
                if operation.request_body_required {
                    violations.push("request body is required".to_string());
                }
                None
            }
        };

        if !violations.is_empty() {
            debug!(
                operation_id = %operation.operation_id,
                violation_count = violations.len(),
                "Request validation failed"
            );
            return Err(Error::validation(violations));
        }

        Ok(BoundRequest {
            path_params,
            query_params,
            body,
        })
    }

    /// Validate a composed response body against the operation's declared
    /// schema for a status code.
    ///
    /// This is a correctness safety-net: the dispatcher logs failures and
    /// ships the response anyway unless configured to enforce, since
    /// rejecting a valid-looking response at the boundary is worse than
    /// shipping one with a logged mismatch.
    pub fn validate_response(
        &self,
        operation: &Operation,
        status: u16,
        body: &Value,
    ) -> Result<()> {
        let spec = self.specification();
        let status_key = if operation.responses.contains_key(&status.to_string()) {
            status.to_string()
        } else {
            "default".to_string()
        };
        if let Some(validator) = spec.response_validator(&operation.operation_id, &status_key) {
            let violations: Vec<String> = validator
                .iter_errors(body)
                .map(|e| format!("response body: {e}"))
                .collect();
            if !violations.is_empty() {
                return Err(Error::validation(violations));
            }
        }
        Ok(())
    }
}
