use super::types::{
    Operation, ParameterLocation, ParameterMeta, ResponseDefinition, ResponseHeader,
};
use super::{Specification, ValidatorKey};
use crate::error::{Error, Result};
use jsonschema::Validator;
use oas3::spec::{ObjectOrReference, Parameter};
use oas3::OpenApiV3Spec;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolve a JSON Schema `$ref` to the actual schema definition.
///
/// Looks up references like `#/components/schemas/Pet` in the document and
/// returns the resolved schema object, or `None` if it can't be resolved.
pub fn resolve_schema_ref<'a>(
    spec: &'a OpenApiV3Spec,
    ref_path: &str,
) -> Option<&'a oas3::spec::ObjectSchema> {
    if let Some(name) = ref_path.strip_prefix("#/components/schemas/") {
        spec.components
            .as_ref()?
            .schemas
            .get(name)
            .and_then(|schema_ref| match schema_ref {
                ObjectOrReference::Object(schema) => Some(schema),
                _ => None,
            })
    } else {
        None
    }
}

/// Recursively expand all `$ref` references in a schema value in place, so
/// the compiled validators never need to chase references at request time.
pub fn expand_schema_refs(spec: &OpenApiV3Spec, value: &mut Value) {
    match value {
        Value::Object(obj) => {
            if let Some(ref_path) = obj.get("$ref").and_then(|v| v.as_str()) {
                if let Some(schema) = resolve_schema_ref(spec, ref_path) {
                    if let Ok(mut new_val) = serde_json::to_value(schema) {
                        expand_schema_refs(spec, &mut new_val);
                        *value = new_val;
                        return;
                    }
                }
            }
            for v in obj.values_mut() {
                expand_schema_refs(spec, v);
            }
        }
        Value::Array(arr) => {
            for v in arr.iter_mut() {
                expand_schema_refs(spec, v);
            }
        }
        _ => {}
    }
}

fn resolve_parameter_ref<'a>(
    spec: &'a OpenApiV3Spec,
    ref_path: &str,
) -> Option<&'a oas3::spec::Parameter> {
    if let Some(name) = ref_path.strip_prefix("#/components/parameters/") {
        spec.components
            .as_ref()?
            .parameters
            .get(name)
            .and_then(|param_ref| match param_ref {
                ObjectOrReference::Object(param) => Some(param),
                _ => None,
            })
    } else {
        None
    }
}

/// Extract parameter metadata from a parameter list, resolving references.
pub fn extract_parameters(
    spec: &OpenApiV3Spec,
    params: &Vec<ObjectOrReference<Parameter>>,
) -> Vec<ParameterMeta> {
    let mut out = Vec::new();
    for p in params {
        let param = match p {
            ObjectOrReference::Object(obj) => Some(obj),
            ObjectOrReference::Ref { ref_path, .. } => resolve_parameter_ref(spec, ref_path),
        };

        if let Some(param) = param {
            let mut schema = param.schema.as_ref().and_then(|s| match s {
                ObjectOrReference::Object(obj) => serde_json::to_value(obj).ok(),
                ObjectOrReference::Ref { ref_path, .. } => resolve_schema_ref(spec, ref_path)
                    .and_then(|sch| serde_json::to_value(sch).ok()),
            });
            if let Some(ref mut val) = schema {
                expand_schema_refs(spec, val);
            }

            out.push(ParameterMeta {
                name: param.name.clone(),
                location: ParameterLocation::from(param.location),
                required: param.required.unwrap_or(false),
                schema,
            });
        }
    }
    out
}

/// Extract the `application/json` request body schema and its required flag.
pub fn extract_request_schema(
    spec: &OpenApiV3Spec,
    operation: &oas3::spec::Operation,
) -> (Option<Value>, bool) {
    let mut required = false;
    let mut schema = operation.request_body.as_ref().and_then(|r| match r {
        ObjectOrReference::Object(req_body) => {
            required = req_body.required.unwrap_or(false);
            req_body.content.get("application/json").and_then(|media| {
                match media.schema.as_ref()? {
                    ObjectOrReference::Object(schema_obj) => serde_json::to_value(schema_obj).ok(),
                    ObjectOrReference::Ref { ref_path, .. } => resolve_schema_ref(spec, ref_path)
                        .and_then(|s| serde_json::to_value(s).ok()),
                }
            })
        }
        _ => None,
    });
    if let Some(ref mut val) = schema {
        expand_schema_refs(spec, val);
    }
    (schema, required)
}

/// Extract every response definition of an operation, keyed by status code
/// string. The OpenAPI `default` response is kept under the `default` key so
/// composition can fall back to it for undeclared statuses.
pub fn extract_responses(
    spec: &OpenApiV3Spec,
    operation: &oas3::spec::Operation,
    location: &str,
) -> HashMap<String, ResponseDefinition> {
    let mut out = HashMap::new();

    if let Some(responses_map) = operation.responses.as_ref() {
        for (status_str, resp_ref) in responses_map {
            if status_str != "default" && status_str.parse::<u16>().is_err() {
                warn!(
                    location = %location,
                    status = %status_str,
                    "Skipping response with unparseable status key"
                );
                continue;
            }
            let resp_obj = match resp_ref {
                ObjectOrReference::Object(obj) => obj,
                _ => continue,
            };

            let mut schema = resp_obj
                .content
                .get("application/json")
                .and_then(|media| media.schema.as_ref())
                .and_then(|s| match s {
                    ObjectOrReference::Object(schema_obj) => serde_json::to_value(schema_obj).ok(),
                    ObjectOrReference::Ref { ref_path, .. } => resolve_schema_ref(spec, ref_path)
                        .and_then(|sch| serde_json::to_value(sch).ok()),
                });
            if let Some(ref mut val) = schema {
                expand_schema_refs(spec, val);
            }

            let headers = resp_obj
                .headers
                .iter()
                .map(|(name, header_ref)| {
                    let default = serde_json::to_value(header_ref).ok().and_then(|v| {
                        v.get("schema")
                            .and_then(|s| s.get("default"))
                            .cloned()
                    });
                    ResponseHeader {
                        name: name.clone(),
                        default,
                    }
                })
                .collect();

            out.insert(
                status_str.clone(),
                ResponseDefinition {
                    schema,
                    headers,
                    has_content: !resp_obj.content.is_empty(),
                },
            );
        }
    }
    out
}

fn compile_into(
    validators: &mut HashMap<ValidatorKey, Arc<Validator>>,
    issues: &mut Vec<String>,
    key: ValidatorKey,
    location: &str,
    schema: &Value,
) {
    match Validator::new(schema) {
        Ok(compiled) => {
            validators.insert(key, Arc::new(compiled));
        }
        Err(e) => issues.push(format!("{location}: uncompilable schema: {e}")),
    }
}

/// Build an immutable [`Specification`] from a parsed OpenAPI document.
///
/// Walks every path/method pair, resolves references, and precompiles all
/// request, parameter, and response validators. Fails with a single
/// [`Error::SpecLoad`] listing every issue found (missing or duplicate
/// operation ids, uncompilable schemas) so a misconfigured spec is fully
/// diagnosed in one pass at startup.
pub fn build_specification(spec: &OpenApiV3Spec) -> Result<Specification> {
    let slug = spec
        .info
        .title
        .to_lowercase()
        .replace(|c: char| !c.is_ascii_alphanumeric(), "_")
        .trim_matches('_')
        .to_string();

    let mut operations: HashMap<String, Arc<Operation>> = HashMap::new();
    let mut validators: HashMap<ValidatorKey, Arc<Validator>> = HashMap::new();
    let mut issues: Vec<String> = Vec::new();

    if let Some(paths_map) = spec.paths.as_ref() {
        for (path, item) in paths_map {
            for (method, op) in item.methods() {
                let location = format!("{method} {path}");

                let operation_id = match op.operation_id.clone() {
                    Some(id) => id,
                    None => {
                        issues.push(format!("{location}: missing operationId"));
                        continue;
                    }
                };
                if operations.contains_key(&operation_id) {
                    issues.push(format!(
                        "{location}: duplicate operationId `{operation_id}`"
                    ));
                    continue;
                }

                let mut parameters = Vec::new();
                parameters.extend(extract_parameters(spec, &item.parameters));
                parameters.extend(extract_parameters(spec, &op.parameters));

                let (request_schema, request_body_required) = extract_request_schema(spec, op);
                let responses = extract_responses(spec, op, &location);

                if let Some(ref schema) = request_schema {
                    compile_into(
                        &mut validators,
                        &mut issues,
                        ValidatorKey::Request(operation_id.clone()),
                        &format!("{location} requestBody"),
                        schema,
                    );
                }
                for param in &parameters {
                    if let Some(ref schema) = param.schema {
                        compile_into(
                            &mut validators,
                            &mut issues,
                            ValidatorKey::Parameter(operation_id.clone(), param.name.clone()),
                            &format!("{location} parameter `{}`", param.name),
                            schema,
                        );
                    }
                }
                for (status_key, def) in &responses {
                    if let Some(ref schema) = def.schema {
                        compile_into(
                            &mut validators,
                            &mut issues,
                            ValidatorKey::Response(operation_id.clone(), status_key.clone()),
                            &format!("{location} response {status_key}"),
                            schema,
                        );
                    }
                }

                debug!(
                    operation_id = %operation_id,
                    method = %method,
                    path = %path,
                    parameter_count = parameters.len(),
                    response_count = responses.len(),
                    "Operation loaded"
                );

                operations.insert(
                    operation_id.clone(),
                    Arc::new(Operation {
                        operation_id,
                        method: method.clone(),
                        path_pattern: path.clone(),
                        parameters,
                        request_schema,
                        request_body_required,
                        responses,
                    }),
                );
            }
        }
    }

    if !issues.is_empty() {
        return Err(Error::SpecLoad(issues.join("; ")));
    }

    Ok(Specification::new(slug, operations, validators))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(yaml: &str) -> OpenApiV3Spec {
        serde_yaml::from_str(yaml).expect("test spec must parse")
    }

    const REF_SPEC: &str = r#"openapi: 3.1.0
info:
  title: Ref API
  version: "1.0"
components:
  schemas:
    Pet:
      type: object
      properties:
        name: { type: string }
        owner: { $ref: '#/components/schemas/Owner' }
    Owner:
      type: object
      properties:
        id: { type: integer }
paths:
  /pets:
    post:
      operationId: add_pet
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/Pet'
      responses:
        "201":
          description: Created
"#;

    #[test]
    fn test_expand_schema_refs_nested() {
        let spec = doc(REF_SPEC);
        let mut value = json!({ "$ref": "#/components/schemas/Pet" });
        expand_schema_refs(&spec, &mut value);
        assert_eq!(value["properties"]["name"]["type"], "string");
        // nested reference is expanded too
        assert_eq!(
            value["properties"]["owner"]["properties"]["id"]["type"],
            "integer"
        );
    }

    #[test]
    fn test_request_schema_required_flag() {
        let spec = doc(REF_SPEC);
        let built = build_specification(&spec).expect("spec builds");
        let op = built.operation("add_pet").expect("operation present");
        assert!(op.request_body_required);
        assert!(op.request_schema.is_some());
        assert!(!op.responses["201"].has_content);
    }

    #[test]
    fn test_missing_operation_id_lists_location() {
        let spec = doc(
            r#"openapi: 3.1.0
info:
  title: Bad API
  version: "1.0"
paths:
  /foo:
    get:
      responses:
        "200": { description: OK }
"#,
        );
        let err = build_specification(&spec).expect_err("must fail");
        let msg = err.to_string();
        assert!(msg.contains("missing operationId"));
        assert!(msg.contains("/foo"));
    }

    #[test]
    fn test_duplicate_operation_id_rejected() {
        let spec = doc(
            r#"openapi: 3.1.0
info:
  title: Dup API
  version: "1.0"
paths:
  /a:
    get:
      operationId: same
      responses:
        "200": { description: OK }
  /b:
    get:
      operationId: same
      responses:
        "200": { description: OK }
"#,
        );
        let err = build_specification(&spec).expect_err("must fail");
        assert!(err.to_string().contains("duplicate operationId"));
    }

    #[test]
    fn test_slug_from_title() {
        let spec = doc(
            r#"openapi: 3.1.0
info:
  title: "Pet Store! v2"
  version: "1.0"
paths: {}
"#,
        );
        let built = build_specification(&spec).expect("spec builds");
        assert_eq!(built.slug(), "pet_store__v2");
        assert!(built.is_empty());
    }
}
