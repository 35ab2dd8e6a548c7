//! Link HTTP handlers.
//!
//! ```text
//! GET    /api/v1/users/{user_id}/links
//! POST   /api/v1/users/{user_id}/links
//! PUT    /api/v1/users/{user_id}/links/{link_id}
//! DELETE /api/v1/users/{user_id}/links/{link_id}
//! POST   /api/v1/users/{user_id}/links/{link_id}/clicks
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, Link, LinkChanges, LinkId, NewLink, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Response payload for a link.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub url: String,
    pub position: i32,
    pub is_active: bool,
    pub clicks: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Link> for LinkResponse {
    fn from(value: Link) -> Self {
        Self {
            id: *value.id.as_uuid(),
            user_id: *value.user_id.as_uuid(),
            title: value.title,
            url: value.url,
            position: value.position,
            is_active: value.is_active,
            clicks: value.clicks,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Request payload for creating a link.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub position: i32,
}

/// Request payload for updating a link. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkRequest {
    pub title: Option<String>,
    pub url: Option<String>,
    pub position: Option<i32>,
    pub is_active: Option<bool>,
}

/// List a user's links in display order.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/links",
    params(("user_id" = Uuid, Path, description = "Link owner")),
    responses(
        (status = 200, description = "Links ordered by position", body = [LinkResponse])
    ),
    tags = ["links"],
    operation_id = "listLinks"
)]
#[get("/users/{user_id}/links")]
pub async fn list_links(
    state: web::Data<HttpState>,
    user_id: web::Path<Uuid>,
) -> ApiResult<web::Json<Vec<LinkResponse>>> {
    let links = state
        .links
        .list(&UserId::from_uuid(user_id.into_inner()))
        .await?;
    Ok(web::Json(links.into_iter().map(LinkResponse::from).collect()))
}

/// Add a link to a user's page.
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/links",
    params(("user_id" = Uuid, Path, description = "Link owner")),
    request_body = CreateLinkRequest,
    responses(
        (status = 201, description = "Created link", body = LinkResponse),
        (status = 400, description = "Invalid title or destination", body = Error)
    ),
    tags = ["links"],
    operation_id = "createLink"
)]
#[post("/users/{user_id}/links")]
pub async fn create_link(
    state: web::Data<HttpState>,
    user_id: web::Path<Uuid>,
    payload: web::Json<CreateLinkRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let new_link = NewLink::new(payload.title, payload.url, payload.position)?;
    let link = state
        .links
        .create(UserId::from_uuid(user_id.into_inner()), new_link)
        .await?;
    Ok(HttpResponse::Created().json(LinkResponse::from(link)))
}

/// Update one of a user's links.
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/links/{link_id}",
    params(
        ("user_id" = Uuid, Path, description = "Link owner"),
        ("link_id" = Uuid, Path, description = "Link to update")
    ),
    request_body = UpdateLinkRequest,
    responses(
        (status = 200, description = "Updated link", body = LinkResponse),
        (status = 400, description = "Invalid title or destination", body = Error),
        (status = 404, description = "No such link for this user", body = Error)
    ),
    tags = ["links"],
    operation_id = "updateLink"
)]
#[put("/users/{user_id}/links/{link_id}")]
pub async fn update_link(
    state: web::Data<HttpState>,
    path: web::Path<(Uuid, Uuid)>,
    payload: web::Json<UpdateLinkRequest>,
) -> ApiResult<web::Json<LinkResponse>> {
    let (user_id, link_id) = path.into_inner();
    let payload = payload.into_inner();
    let changes = LinkChanges {
        title: payload.title,
        url: payload.url,
        position: payload.position,
        is_active: payload.is_active,
    };
    let link = state
        .links
        .update(
            &UserId::from_uuid(user_id),
            &LinkId::from_uuid(link_id),
            changes,
        )
        .await?;
    Ok(web::Json(LinkResponse::from(link)))
}

/// Remove one of a user's links.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}/links/{link_id}",
    params(
        ("user_id" = Uuid, Path, description = "Link owner"),
        ("link_id" = Uuid, Path, description = "Link to delete")
    ),
    responses(
        (status = 204, description = "Link deleted"),
        (status = 404, description = "No such link for this user", body = Error)
    ),
    tags = ["links"],
    operation_id = "deleteLink"
)]
#[delete("/users/{user_id}/links/{link_id}")]
pub async fn delete_link(
    state: web::Data<HttpState>,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<HttpResponse> {
    let (user_id, link_id) = path.into_inner();
    state
        .links
        .delete(&UserId::from_uuid(user_id), &LinkId::from_uuid(link_id))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Count a visitor click on a link.
///
/// Public endpoint used by the redirect flow, so the owner path segment is
/// not an ownership check.
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/links/{link_id}/clicks",
    params(
        ("user_id" = Uuid, Path, description = "Link owner"),
        ("link_id" = Uuid, Path, description = "Clicked link")
    ),
    responses(
        (status = 200, description = "Link with the updated click count", body = LinkResponse),
        (status = 404, description = "No such link", body = Error)
    ),
    tags = ["links"],
    operation_id = "recordLinkClick"
)]
#[post("/users/{user_id}/links/{link_id}/clicks")]
pub async fn record_click(
    state: web::Data<HttpState>,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<web::Json<LinkResponse>> {
    let (_user_id, link_id) = path.into_inner();
    let link = state.links.record_click(&LinkId::from_uuid(link_id)).await?;
    Ok(web::Json(LinkResponse::from(link)))
}
