//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{links, notifications, profiles, tips};

/// Row struct for reading from the profiles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable/changeset struct for upserting profile records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = profiles)]
pub(crate) struct ProfileUpsert<'a> {
    pub user_id: Uuid,
    pub username: &'a str,
    pub display_name: &'a str,
    pub bio: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the links table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = links)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LinkRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub url: String,
    pub position: i32,
    pub is_active: bool,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new link records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = links)]
pub(crate) struct NewLinkRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: &'a str,
    pub url: &'a str,
    pub position: i32,
    pub is_active: bool,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset struct for replacing an existing link record.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = links)]
pub(crate) struct LinkUpdate<'a> {
    pub title: &'a str,
    pub url: &'a str,
    pub position: i32,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the notifications table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new notification records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: &'a str,
    pub message: &'a str,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the tips table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tips)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TipRow {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub amount: f64,
    pub memo: Option<String>,
    pub payment_id: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new tip records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tips)]
pub(crate) struct NewTipRow<'a> {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub amount: f64,
    pub memo: Option<&'a str>,
    pub payment_id: &'a str,
    pub created_at: DateTime<Utc>,
}
