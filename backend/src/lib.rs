//! Recipe-sharing backend library: domain model, HTTP adapter and storage.
//!
//! The binary in `main.rs` wires these modules into an Actix server; the
//! library surface exists so integration tests can drive the same services.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
