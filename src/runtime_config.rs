//! Environment variable-based runtime configuration.
//!
//! ## Environment variables
//!
//! - `OASBRIDGE_VALIDATE_RESPONSES` — validate composed response bodies
//!   against the spec and log mismatches (default: `true`).
//! - `OASBRIDGE_ENFORCE_RESPONSES` — treat a response-schema mismatch as a
//!   server error instead of logging it (default: `false`).
//! - `OASBRIDGE_STRICT_PARAMS` — reject requests carrying parameters the
//!   handler signature does not consume, instead of logging and dropping
//!   them (default: `false`).

use std::env;

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(val) => matches!(val.to_ascii_lowercase().as_str(), "1" | "true" | "on" | "yes"),
        Err(_) => default,
    }
}

/// Runtime behavior toggles, loaded once at startup.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Validate response bodies against the spec (log-only safety net).
    pub validate_responses: bool,
    /// Escalate response-schema mismatches to 500s instead of shipping them.
    pub enforce_responses: bool,
    /// Fail requests whose parameters the handler does not consume.
    pub strict_params: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            validate_responses: true,
            enforce_responses: false,
            strict_params: false,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            validate_responses: env_flag("OASBRIDGE_VALIDATE_RESPONSES", true),
            enforce_responses: env_flag("OASBRIDGE_ENFORCE_RESPONSES", false),
            strict_params: env_flag("OASBRIDGE_STRICT_PARAMS", false),
        }
    }
}
