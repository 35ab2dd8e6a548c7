//! Notification read/acknowledge use-cases.

use std::sync::Arc;

use super::error::Error;
use super::events::{ChangeEvent, RecordKind};
use super::notifications::{Notification, NotificationId};
use super::ports::{ChangePublisher, NotificationRepository};
use super::profile::UserId;

/// Notification use-cases over a [`NotificationRepository`].
pub struct NotificationService<N: ?Sized> {
    notifications: Arc<N>,
    publisher: Arc<dyn ChangePublisher>,
}

impl<N: ?Sized> NotificationService<N> {
    pub fn new(notifications: Arc<N>, publisher: Arc<dyn ChangePublisher>) -> Self {
        Self {
            notifications,
            publisher,
        }
    }
}

impl<N: NotificationRepository + ?Sized> NotificationService<N> {
    /// All notifications for a user, newest first.
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<Notification>, Error> {
        Ok(self.notifications.list_for_user(user_id).await?)
    }

    /// Mark one of the user's notifications as read.
    ///
    /// Notifications belonging to other users surface as not-found.
    pub async fn mark_read(
        &self,
        user_id: &UserId,
        notification_id: &NotificationId,
    ) -> Result<Notification, Error> {
        let updated = self
            .notifications
            .mark_read(user_id, notification_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("no notification {notification_id}")))?;
        self.publisher.publish(ChangeEvent::update(
            *user_id,
            RecordKind::Notification,
            &updated,
            None,
        ));
        Ok(updated)
    }
}
