//! Driven adapters: persistence, payment gateways, and the realtime hub.
//!
//! Everything here implements a port from `crate::domain::ports`. Adapters
//! translate between domain types and their backing technology; no business
//! rules live on this side of the hexagon.

pub mod feed;
pub mod payments;
pub mod persistence;
