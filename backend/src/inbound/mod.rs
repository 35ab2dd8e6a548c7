//! Driving adapters: the HTTP API and the WebSocket change feed.

pub mod http;
pub mod ws;
