//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation.

diesel::table! {
    /// Public profiles, one per user.
    profiles (user_id) {
        /// Primary key: the owning user's UUID.
        user_id -> Uuid,
        /// Unique handle; uniqueness is enforced case-insensitively via a
        /// functional index on `lower(username)`.
        username -> Varchar,
        display_name -> Varchar,
        bio -> Nullable<Text>,
        avatar_url -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Links shown on a profile page.
    links (id) {
        id -> Uuid,
        user_id -> Uuid,
        title -> Varchar,
        url -> Text,
        /// Display order within the owner's page, ascending.
        position -> Int4,
        is_active -> Bool,
        clicks -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// In-app notifications.
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        /// Storage string for the notification kind.
        kind -> Varchar,
        message -> Text,
        read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Recorded tips; written once the backing payment completed.
    tips (id) {
        id -> Uuid,
        from_user_id -> Uuid,
        to_user_id -> Uuid,
        /// Amount in Pi.
        amount -> Float8,
        memo -> Nullable<Text>,
        /// Identifier of the completed payment.
        payment_id -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(profiles, links, notifications, tips);
