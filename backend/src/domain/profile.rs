//! Profile aggregate and user identity.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::Error;
use super::username::Username;

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;
/// Maximum allowed length for a bio.
pub const BIO_MAX: usize = 500;

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Public profile backing a link-in-bio page.
///
/// ## Invariants
/// - `username` satisfies the rules in [`crate::domain::username`].
/// - `display_name` is non-empty once trimmed and at most 64 characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: UserId,
    pub username: Username,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Build a new profile with fresh timestamps.
    pub fn new(
        user_id: UserId,
        username: Username,
        display_name: impl Into<String>,
    ) -> Result<Self, Error> {
        let display_name = validate_display_name(display_name.into())?;
        let now = Utc::now();
        Ok(Self {
            user_id,
            username,
            display_name,
            bio: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Requested changes to a profile; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<Username>,
    pub display_name: Option<String>,
    pub bio: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
}

pub(crate) fn validate_display_name(display_name: String) -> Result<String, Error> {
    if display_name.trim().is_empty() {
        return Err(Error::invalid_request("display name must not be empty"));
    }
    if display_name.chars().count() > DISPLAY_NAME_MAX {
        return Err(Error::invalid_request(format!(
            "display name must be at most {DISPLAY_NAME_MAX} characters"
        )));
    }
    Ok(display_name)
}

pub(crate) fn validate_bio(bio: Option<String>) -> Result<Option<String>, Error> {
    match bio {
        Some(text) if text.chars().count() > BIO_MAX => Err(Error::invalid_request(format!(
            "bio must be at most {BIO_MAX} characters"
        ))),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn username() -> Username {
        Username::new("tester").expect("valid handle")
    }

    #[rstest]
    fn new_profile_has_no_bio_or_avatar() {
        let profile = Profile::new(UserId::random(), username(), "Tester").expect("valid");
        assert!(profile.bio.is_none());
        assert!(profile.avatar_url.is_none());
        assert_eq!(profile.created_at, profile.updated_at);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn rejects_blank_display_names(#[case] value: &str) {
        let error = Profile::new(UserId::random(), username(), value).expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn rejects_oversized_display_names() {
        let long = "x".repeat(DISPLAY_NAME_MAX + 1);
        let error = Profile::new(UserId::random(), username(), long).expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn bio_length_is_bounded() {
        assert!(validate_bio(Some("short".into())).is_ok());
        assert!(validate_bio(None).is_ok());
        assert!(validate_bio(Some("x".repeat(BIO_MAX + 1))).is_err());
    }

    #[rstest]
    fn user_id_serialises_transparently() {
        let id = UserId::random();
        let json = serde_json::to_string(&id).expect("serializes");
        assert_eq!(json, format!("\"{id}\""));
    }
}
