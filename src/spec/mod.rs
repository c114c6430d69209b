//! OpenAPI 3 document loading and operation metadata.
//!
//! A [`Specification`] is built exactly once from a YAML or JSON file and is
//! read-only for the life of the process. Operation metadata and the compiled
//! JSON Schema validators for every request body, parameter, and response are
//! all derived here at load time; nothing is compiled per request.

mod build;
mod load;
mod types;

pub use build::build_specification;
pub use load::{load_document, load_specification};
pub use types::{
    Operation, ParameterLocation, ParameterMeta, ResponseDefinition, ResponseHeader,
};

use jsonschema::Validator;
use std::collections::HashMap;
use std::sync::Arc;

/// Key for a precompiled schema validator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ValidatorKey {
    /// Request body validator for an operation id.
    Request(String),
    /// Parameter validator for (operation id, parameter name).
    Parameter(String, String),
    /// Response body validator for (operation id, status key).
    Response(String, String),
}

/// An immutable, fully-loaded OpenAPI document with its compiled validators.
pub struct Specification {
    slug: String,
    operations: HashMap<String, Arc<Operation>>,
    validators: HashMap<ValidatorKey, Arc<Validator>>,
}

impl Specification {
    pub(crate) fn new(
        slug: String,
        operations: HashMap<String, Arc<Operation>>,
        validators: HashMap<ValidatorKey, Arc<Validator>>,
    ) -> Self {
        Self {
            slug,
            operations,
            validators,
        }
    }

    /// URL-safe slug derived from the document's `info.title`.
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Look up an operation by its operation id.
    pub fn operation(&self, operation_id: &str) -> Option<&Arc<Operation>> {
        self.operations.get(operation_id)
    }

    /// All loaded operations, in no particular order.
    pub fn operations(&self) -> impl Iterator<Item = &Arc<Operation>> {
        self.operations.values()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub(crate) fn request_validator(&self, operation_id: &str) -> Option<&Validator> {
        self.validators
            .get(&ValidatorKey::Request(operation_id.to_string()))
            .map(Arc::as_ref)
    }

    pub(crate) fn parameter_validator(
        &self,
        operation_id: &str,
        name: &str,
    ) -> Option<&Validator> {
        self.validators
            .get(&ValidatorKey::Parameter(
                operation_id.to_string(),
                name.to_string(),
            ))
            .map(Arc::as_ref)
    }

    pub(crate) fn response_validator(
        &self,
        operation_id: &str,
        status_key: &str,
    ) -> Option<&Validator> {
        self.validators
            .get(&ValidatorKey::Response(
                operation_id.to_string(),
                status_key.to_string(),
            ))
            .map(Arc::as_ref)
    }
}

impl std::fmt::Debug for Specification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Specification")
            .field("slug", &self.slug)
            .field("operations", &self.operations.len())
            .field("validators", &self.validators.len())
            .finish()
    }
}
