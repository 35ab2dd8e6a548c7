//! Profile HTTP handlers.
//!
//! ```text
//! GET /api/v1/users/{user_id}/profile
//! PUT /api/v1/users/{user_id}/profile
//! ```

use actix_web::{HttpResponse, get, put, web};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, Profile, ProfileChanges, UserId, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Response payload for a profile.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Profile> for ProfileResponse {
    fn from(value: Profile) -> Self {
        Self {
            user_id: *value.user_id.as_uuid(),
            username: value.username.as_str().to_owned(),
            display_name: value.display_name,
            bio: value.bio,
            avatar_url: value.avatar_url,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Distinguishes an absent field from an explicit `null`: absent leaves the
/// stored value alone, `null` clears it.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request payload for updating a profile. Every field is optional.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, nullable)]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, nullable)]
    pub avatar_url: Option<Option<String>>,
}

fn parse_username(value: String) -> Result<Username, Error> {
    Username::new(value).map_err(|err| Error::invalid_request(err.to_string()))
}

/// Fetch one user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/profile",
    params(("user_id" = Uuid, Path, description = "Profile owner")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "No profile for this user", body = Error)
    ),
    tags = ["profiles"],
    operation_id = "getProfile"
)]
#[get("/users/{user_id}/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    user_id: web::Path<Uuid>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let profile = state
        .profiles
        .get(&UserId::from_uuid(user_id.into_inner()))
        .await?;
    Ok(web::Json(ProfileResponse::from(profile)))
}

/// Create or update a user's profile.
///
/// A first PUT with `username` and `displayName` creates the profile;
/// subsequent PUTs apply the populated fields as changes.
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/profile",
    params(("user_id" = Uuid, Path, description = "Profile owner")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 201, description = "Created profile", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username already taken", body = Error)
    ),
    tags = ["profiles"],
    operation_id = "putProfile"
)]
#[put("/users/{user_id}/profile")]
pub async fn put_profile(
    state: web::Data<HttpState>,
    user_id: web::Path<Uuid>,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = UserId::from_uuid(user_id.into_inner());
    let payload = payload.into_inner();

    match state.profiles.get(&user_id).await {
        Ok(_) => {}
        Err(err) if err.code() == crate::domain::ErrorCode::NotFound => {
            // First write: both identity fields are required.
            let (Some(username), Some(display_name)) = (payload.username, payload.display_name)
            else {
                return Err(Error::invalid_request(
                    "username and displayName are required to create a profile",
                ));
            };
            let created = state
                .profiles
                .create(user_id, parse_username(username)?, display_name)
                .await?;
            return Ok(HttpResponse::Created().json(ProfileResponse::from(created)));
        }
        Err(err) => return Err(err),
    }

    let changes = ProfileChanges {
        username: payload.username.map(parse_username).transpose()?,
        display_name: payload.display_name,
        bio: payload.bio,
        avatar_url: payload.avatar_url,
    };
    let updated = state.profiles.update(&user_id, changes).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(updated)))
}
