//! Username availability HTTP handler.
//!
//! ```text
//! GET /api/v1/usernames/{candidate}/availability
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{UserId, UsernameCheck};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Query parameters for the availability check.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    /// Owner to exclude from the taken check, so users can re-claim their
    /// current handle while editing their profile.
    pub exclude_user_id: Option<Uuid>,
}

/// Check whether a handle is valid and free, suggesting alternatives when
/// it is taken.
#[utoipa::path(
    get,
    path = "/api/v1/usernames/{candidate}/availability",
    params(
        ("candidate" = String, Path, description = "Handle to check"),
        ("excludeUserId" = Option<Uuid>, Query, description = "Owner to exclude from the taken check")
    ),
    responses(
        (status = 200, description = "Check result", body = UsernameCheck)
    ),
    tags = ["usernames"],
    operation_id = "checkUsernameAvailability"
)]
#[get("/usernames/{candidate}/availability")]
pub async fn check_availability(
    state: web::Data<HttpState>,
    candidate: web::Path<String>,
    query: web::Query<AvailabilityQuery>,
) -> ApiResult<web::Json<UsernameCheck>> {
    let exclude = query.exclude_user_id.map(UserId::from_uuid);
    let check = state
        .usernames
        .check(candidate.as_str(), exclude.as_ref())
        .await;
    Ok(web::Json(check))
}
