use super::build::build_specification;
use super::Specification;
use crate::error::{Error, Result};
use oas3::OpenApiV3Spec;
use std::path::Path;
use tracing::info;

fn strip_unknown_verbs(val: &mut serde_json::Value) {
    const METHODS: [&str; 8] = [
        "get", "post", "put", "delete", "patch", "options", "head", "trace",
    ];

    if let Some(paths) = val.get_mut("paths") {
        if let serde_json::Value::Object(paths_map) = paths {
            for item in paths_map.values_mut() {
                if let serde_json::Value::Object(obj) = item {
                    let keys: Vec<String> = obj.keys().cloned().collect();
                    for k in keys {
                        let lk = k.to_ascii_lowercase();
                        let keep = match lk.as_str() {
                            "summary" | "description" | "servers" | "parameters" | "$ref" => true,
                            m if METHODS.contains(&m) => true,
                            _ => k.starts_with("x-"),
                        };
                        if !keep {
                            obj.remove(&k);
                        }
                    }
                }
            }
        }
    }
}

/// Parse an OpenAPI v3 document from a YAML or JSON file.
///
/// The format is chosen by file extension (`.yaml`/`.yml` is YAML, anything
/// else JSON). Unknown verbs under `paths` are stripped before
/// deserialization so vendor extensions at the path level don't reject an
/// otherwise valid document.
pub fn load_document(path: &Path) -> Result<OpenApiV3Spec> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::SpecLoad(format!("{}: {e}", path.display())))?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let mut value: serde_json::Value = if is_yaml {
        serde_yaml::from_str(&content)
            .map_err(|e| Error::SpecLoad(format!("{}: invalid YAML: {e}", path.display())))?
    } else {
        serde_json::from_str(&content)
            .map_err(|e| Error::SpecLoad(format!("{}: invalid JSON: {e}", path.display())))?
    };

    strip_unknown_verbs(&mut value);
    serde_json::from_value(value)
        .map_err(|e| Error::SpecLoad(format!("{}: not a valid OpenAPI v3 document: {e}", path.display())))
}

/// Load and build a [`Specification`] from a file path in one step.
pub fn load_specification(path: &Path) -> Result<Specification> {
    let document = load_document(path)?;
    let spec = build_specification(&document)?;
    info!(
        path = %path.display(),
        slug = %spec.slug(),
        operations = spec.len(),
        "OpenAPI specification loaded"
    );
    Ok(spec)
}
