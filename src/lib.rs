//! # oasbridge
//!
//! **oasbridge** is a framework-agnostic bridge between an HTTP-serving host
//! and business-logic handlers declared as [OpenAPI v3](https://spec.openapis.org/oas/v3.1.0)
//! operations. It validates incoming requests and outgoing responses against
//! a single file-loaded OpenAPI document, maps validated path/query/body
//! values onto a handler's declared parameter list, invokes the handler
//! through an injected invocation callback, and translates the result back
//! into a validated, serialized HTTP response.
//!
//! It is not an HTTP server: the host owns the transport, the routing table
//! (path-template variables arrive already resolved), and the scheduling of
//! handlers. Only single-document, file-loaded specs with JSON bodies are
//! supported.
//!
//! ## Architecture
//!
//! - **[`spec`]** - OpenAPI document loading, operation metadata, and
//!   load-time validator compilation
//! - **[`registry`]** - the one-shot-loaded [`SpecRegistry`] with request and
//!   response validation
//! - **[`binder`]** - mapping validated requests onto statically declared
//!   handler signatures
//! - **[`composer`]** / **[`encode`]** - handler result → wire response, with
//!   ISO-8601 timestamp and model-mapping encoding
//! - **[`dispatcher`]** - per-request orchestration and error-to-response
//!   mapping
//!
//! Data flow for one request:
//!
//! ```text
//! RawRequest → SpecRegistry::validate_request → bind → invoker (host)
//!            → HandlerResult → compose → ComposedResponse
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use oasbridge::{
//!     HandlerResult, HandlerSignature, OperationDispatcher, RawRequest, SpecRegistry,
//! };
//! use std::sync::Arc;
//!
//! let registry = Arc::new(SpecRegistry::new());
//! registry.load("openapi.yaml").expect("spec must load");
//!
//! let mut dispatcher = OperationDispatcher::new(registry);
//! dispatcher
//!     .register(
//!         "list_pets",
//!         HandlerSignature::new().optional("limit"),
//!         |_args, _ctx| Ok(HandlerResult::ok(serde_json::json!({ "pets": [] }))),
//!     )
//!     .expect("operation must exist in the spec");
//!
//! let request = RawRequest::new(http::Method::GET, "/pets").query_param("limit", "2");
//! let response = dispatcher.dispatch("list_pets", &request);
//! assert_eq!(response.status, 200);
//! ```
//!
//! ## Concurrency
//!
//! The specification is loaded exactly once behind a one-shot gate; readers
//! that arrive early block until it opens and share the immutable document
//! afterwards with no further synchronization. `dispatch` takes `&self` and
//! is safe to call from many threads or coroutines at once; the invocation
//! callback is the only suspension point, and its scheduling model belongs
//! to the host.

pub mod binder;
pub mod composer;
pub mod dispatcher;
pub mod encode;
pub mod error;
pub mod registry;
pub mod request;
pub mod response;
pub mod runtime_config;
pub mod spec;

pub use binder::{bind, BoundArgs, HandlerSignature, ParamSpec};
pub use composer::compose;
pub use dispatcher::{Invoker, OperationDispatcher};
pub use encode::{Model, Payload};
pub use error::{Error, Result};
pub use registry::SpecRegistry;
pub use request::{parse_query_params, BoundRequest, RawRequest, RequestContext};
pub use response::{error_response, ComposedResponse, HandlerResult};
pub use runtime_config::RuntimeConfig;
pub use spec::{
    load_specification, Operation, ParameterLocation, ParameterMeta, ResponseDefinition,
    ResponseHeader, Specification,
};
