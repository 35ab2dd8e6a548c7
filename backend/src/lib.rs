//! Droplink backend library modules.
//!
//! The crate follows a hexagonal layout: `domain` holds the aggregates,
//! ports, and services; `outbound` holds the driven adapters (persistence,
//! payment gateways, the change hub); `inbound` holds the driving adapters
//! (HTTP handlers and the WebSocket change feed); `server` composes them
//! into a running application.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
