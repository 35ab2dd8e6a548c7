//! Shared WebSocket adapter state.

use std::sync::Arc;

use crate::outbound::feed::ChangeHub;

/// Dependency bundle for WebSocket handlers.
#[derive(Clone)]
pub struct WsState {
    pub hub: Arc<ChangeHub>,
}

impl WsState {
    pub fn new(hub: Arc<ChangeHub>) -> Self {
        Self { hub }
    }
}
