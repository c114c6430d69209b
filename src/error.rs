use thiserror::Error;

/// Error taxonomy for the bridge.
///
/// Setup-time variants ([`Error::SpecLoad`], [`Error::UnknownOperation`] at
/// registration) should abort startup. Per-request variants are caught at the
/// dispatcher boundary and converted to JSON error responses.
#[derive(Debug, Error)]
pub enum Error {
    /// The spec file is missing, malformed, or fails OpenAPI validation.
    #[error("failed to load OpenAPI spec: {0}")]
    SpecLoad(String),

    /// No operation with the given id exists in the loaded spec.
    #[error("no operation with id `{0}` in the loaded spec")]
    UnknownOperation(String),

    /// A request or response violated the spec's schema. Carries every
    /// violated constraint, not just the first.
    #[error("validation failed: {}", violations.join("; "))]
    Validation { violations: Vec<String> },

    /// A required handler parameter remained unbound after parameter binding.
    #[error("required parameter `{0}` was not bound from the request")]
    MissingRequiredParameter(String),

    /// The handler returned a status the spec never declared for the operation.
    #[error("status {status} is not declared for operation `{operation_id}`")]
    UndeclaredStatus { operation_id: String, status: u16 },

    /// The handler itself failed.
    #[error("handler failed: {0}")]
    Handler(String),
}

impl Error {
    pub fn validation(violations: Vec<String>) -> Self {
        Error::Validation { violations }
    }

    /// The HTTP status this error maps to at the dispatcher boundary.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation { .. } | Error::MissingRequiredParameter(_) => 400,
            Error::SpecLoad(_)
            | Error::UnknownOperation(_)
            | Error::UndeclaredStatus { .. }
            | Error::Handler(_) => 500,
        }
    }

    /// The message exposed in the error payload. Handler failures collapse to
    /// a generic message so internal details never leak to clients.
    pub fn public_message(&self) -> String {
        match self {
            Error::Handler(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
