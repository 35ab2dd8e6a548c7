//! In-app notifications surfaced on the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::UserId;

/// Stable notification identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

impl NotificationId {
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Category of a notification, stored as a short string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TipReceived,
    PaymentFailed,
    System,
}

impl NotificationKind {
    /// Canonical storage string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TipReceived => "tip_received",
            Self::PaymentFailed => "payment_failed",
            Self::System => "system",
        }
    }

    /// Parse the storage string, defaulting unknown values to `System`.
    pub fn parse_lossy(value: &str) -> Self {
        match value {
            "tip_received" => Self::TipReceived,
            "payment_failed" => Self::PaymentFailed,
            _ => Self::System,
        }
    }
}

/// A notification delivered to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build a fresh unread notification.
    pub fn new(user_id: UserId, kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            id: NotificationId::random(),
            user_id,
            kind,
            message: message.into(),
            read: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn new_notifications_start_unread() {
        let note = Notification::new(UserId::random(), NotificationKind::System, "hello");
        assert!(!note.read);
    }

    #[rstest]
    #[case(NotificationKind::TipReceived, "tip_received")]
    #[case(NotificationKind::PaymentFailed, "payment_failed")]
    #[case(NotificationKind::System, "system")]
    fn kind_round_trips_through_storage_string(
        #[case] kind: NotificationKind,
        #[case] stored: &str,
    ) {
        assert_eq!(kind.as_str(), stored);
        assert_eq!(NotificationKind::parse_lossy(stored), kind);
    }

    #[rstest]
    fn unknown_kind_strings_fall_back_to_system() {
        assert_eq!(
            NotificationKind::parse_lossy("mystery"),
            NotificationKind::System
        );
    }
}
