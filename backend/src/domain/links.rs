//! Link aggregate: one row on a profile page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;
use uuid::Uuid;

use super::error::Error;
use super::profile::UserId;

/// Maximum allowed length for a link title.
pub const TITLE_MAX: usize = 100;

/// Stable link identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(Uuid);

impl LinkId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`LinkId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A single link on a profile page.
///
/// ## Invariants
/// - `title` is non-empty once trimmed and at most 100 characters.
/// - `url` parses as an absolute `http`/`https` URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: LinkId,
    pub user_id: UserId,
    pub title: String,
    pub url: String,
    /// Display order within the owner's page, ascending.
    pub position: i32,
    pub is_active: bool,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Materialise a validated [`NewLink`] as a fresh, active row.
    pub fn create(user_id: UserId, new: NewLink) -> Self {
        let now = Utc::now();
        Self {
            id: LinkId::random(),
            user_id,
            title: new.title,
            url: new.url,
            position: new.position,
            is_active: true,
            clicks: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated input for creating a link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub title: String,
    pub url: String,
    pub position: i32,
}

impl NewLink {
    /// Validate title and destination.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        position: i32,
    ) -> Result<Self, Error> {
        Ok(Self {
            title: validate_title(title.into())?,
            url: validate_destination(url.into())?,
            position,
        })
    }
}

/// Requested changes to a link; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct LinkChanges {
    pub title: Option<String>,
    pub url: Option<String>,
    pub position: Option<i32>,
    pub is_active: Option<bool>,
}

impl LinkChanges {
    /// Validate the populated fields, leaving absent ones alone.
    pub fn validated(mut self) -> Result<Self, Error> {
        if let Some(title) = self.title.take() {
            self.title = Some(validate_title(title)?);
        }
        if let Some(url) = self.url.take() {
            self.url = Some(validate_destination(url)?);
        }
        Ok(self)
    }

    /// True when no field is populated.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.url.is_none()
            && self.position.is_none()
            && self.is_active.is_none()
    }
}

fn validate_title(title: String) -> Result<String, Error> {
    if title.trim().is_empty() {
        return Err(Error::invalid_request("link title must not be empty"));
    }
    if title.chars().count() > TITLE_MAX {
        return Err(Error::invalid_request(format!(
            "link title must be at most {TITLE_MAX} characters"
        )));
    }
    Ok(title)
}

fn validate_destination(url: String) -> Result<String, Error> {
    let parsed = Url::parse(&url).map_err(|_| {
        Error::invalid_request("link destination must be an absolute URL")
            .with_details(json!({ "field": "url", "value": url }))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(url),
        other => Err(
            Error::invalid_request("link destination must use http or https")
                .with_details(json!({ "field": "url", "scheme": other })),
        ),
    }
}
