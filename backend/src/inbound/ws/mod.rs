//! WebSocket inbound adapter bridging row-change events to client frames.
//!
//! Responsibilities:
//! - upgrade `/ws/{user_id}` requests to a WebSocket session
//! - subscribe the session to the owning user's change feed
//! - keep WebSocket-specific concerns at the edge of the system

use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, get};
use tracing::error;
use uuid::Uuid;

use crate::domain::UserId;

mod session;

pub mod state;

/// Handle WebSocket upgrade for the `/ws/{user_id}` endpoint.
///
/// The session forwards every change event scoped to `user_id` as a JSON
/// text frame and is torn down when the client disconnects or goes idle.
#[get("/ws/{user_id}")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    path: web::Path<Uuid>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let user_id = UserId::from_uuid(path.into_inner());
    let feed = state.hub.subscribe(user_id);

    let (response, session, msg_stream) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(%error, "WebSocket upgrade failed");
        error
    })?;

    actix_web::rt::spawn(session::handle_ws_session(feed, session, msg_stream));

    Ok(response)
}
