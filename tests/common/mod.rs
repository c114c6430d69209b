#![allow(dead_code)]

use oasbridge::SpecRegistry;
use std::io::Write;
use std::sync::{Arc, Once};
use tempfile::NamedTempFile;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber so `RUST_LOG=debug` surfaces dispatch
/// logs in failing tests.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub const PETSTORE_YAML: &str = r#"openapi: 3.1.0
info:
  title: Pet Store
  version: "1.0.0"
components:
  schemas:
    Pet:
      type: object
      required: [name, animal_type]
      properties:
        id: { type: integer }
        name: { type: string }
        animal_type: { type: string }
        created: { type: string }
paths:
  /pets:
    get:
      operationId: list_pets
      parameters:
        - name: limit
          in: query
          required: false
          schema: { type: integer }
        - name: animal_type
          in: query
          required: false
          schema: { type: string }
      responses:
        "200":
          description: OK
          content:
            application/json:
              schema:
                type: object
                properties:
                  pets:
                    type: array
                    items: { $ref: '#/components/schemas/Pet' }
    post:
      operationId: add_pet
      requestBody:
        required: true
        content:
          application/json:
            schema: { $ref: '#/components/schemas/Pet' }
      responses:
        "201":
          description: Created
  /pets/{pet_id}:
    parameters:
      - name: pet_id
        in: path
        required: true
        schema: { type: integer }
    get:
      operationId: get_pet
      responses:
        "200":
          description: OK
          content:
            application/json:
              schema: { $ref: '#/components/schemas/Pet' }
        "404":
          description: Not found
          content:
            application/json:
              schema: { type: string }
    put:
      operationId: update_pet
      requestBody:
        required: true
        content:
          application/json:
            schema: { $ref: '#/components/schemas/Pet' }
      responses:
        "200":
          description: OK
          content:
            application/json:
              schema: { $ref: '#/components/schemas/Pet' }
"#;

/// Write a spec to a temp file with the given extension, keeping the file
/// alive for as long as the returned handle is held.
pub fn write_spec(contents: &str, ext: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("oasbridge_test")
        .suffix(&format!(".{ext}"))
        .tempfile()
        .expect("create temp spec file");
    file.write_all(contents.as_bytes())
        .expect("write temp spec file");
    file
}

/// A registry with the pet store spec loaded. The temp file must outlive the
/// registry, so it is returned alongside.
pub fn petstore_registry() -> (Arc<SpecRegistry>, NamedTempFile) {
    init_tracing();
    let file = write_spec(PETSTORE_YAML, "yaml");
    let registry = Arc::new(SpecRegistry::new());
    registry.load(file.path()).expect("pet store spec loads");
    (registry, file)
}
