//! Notification HTTP handlers.
//!
//! ```text
//! GET  /api/v1/users/{user_id}/notifications
//! POST /api/v1/users/{user_id}/notifications/{notification_id}/read
//! ```

use actix_web::{get, post, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, Notification, NotificationId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Response payload for a notification.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(value: Notification) -> Self {
        Self {
            id: *value.id.as_uuid(),
            user_id: *value.user_id.as_uuid(),
            kind: value.kind.as_str().to_owned(),
            message: value.message,
            read: value.read,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// List a user's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/notifications",
    params(("user_id" = Uuid, Path, description = "Notification recipient")),
    responses(
        (status = 200, description = "Notifications, newest first", body = [NotificationResponse])
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/users/{user_id}/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    user_id: web::Path<Uuid>,
) -> ApiResult<web::Json<Vec<NotificationResponse>>> {
    let notifications = state
        .notifications
        .list(&UserId::from_uuid(user_id.into_inner()))
        .await?;
    Ok(web::Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

/// Mark one of a user's notifications as read.
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/notifications/{notification_id}/read",
    params(
        ("user_id" = Uuid, Path, description = "Notification recipient"),
        ("notification_id" = Uuid, Path, description = "Notification to acknowledge")
    ),
    responses(
        (status = 200, description = "Acknowledged notification", body = NotificationResponse),
        (status = 404, description = "No such notification for this user", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[post("/users/{user_id}/notifications/{notification_id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<web::Json<NotificationResponse>> {
    let (user_id, notification_id) = path.into_inner();
    let notification = state
        .notifications
        .mark_read(
            &UserId::from_uuid(user_id),
            &NotificationId::from_uuid(notification_id),
        )
        .await?;
    Ok(web::Json(NotificationResponse::from(notification)))
}
