//! Port for notification persistence.

use async_trait::async_trait;

use crate::domain::{Error, Notification, NotificationId, UserId};

/// Errors raised by notification repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationRepositoryError {
    /// Repository connection could not be established.
    #[error("notification repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("notification repository query failed: {message}")]
    Query { message: String },
}

impl NotificationRepositoryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

impl From<NotificationRepositoryError> for Error {
    fn from(value: NotificationRepositoryError) -> Self {
        match value {
            NotificationRepositoryError::Connection { message } => {
                Self::service_unavailable(format!("notification store unavailable: {message}"))
            }
            NotificationRepositoryError::Query { message } => {
                Self::internal(format!("notification store error: {message}"))
            }
        }
    }
}

/// Port for notification storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert a new notification row.
    async fn insert(&self, notification: &Notification)
    -> Result<(), NotificationRepositoryError>;

    /// All notifications for `user_id`, newest first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError>;

    /// Mark one of the user's notifications read, returning the updated row
    /// or `None` when it does not exist (or belongs to someone else).
    async fn mark_read(
        &self,
        user_id: &UserId,
        notification_id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationRepositoryError>;
}

