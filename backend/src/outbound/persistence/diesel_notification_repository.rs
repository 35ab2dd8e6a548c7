//! PostgreSQL-backed `NotificationRepository` implementation using Diesel
//! ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{Notification, NotificationId, NotificationKind, UserId};

use super::models::{NewNotificationRow, NotificationRow};
use super::pool::{DbPool, PoolError};
use super::schema::notifications;

/// Diesel-backed implementation of the `NotificationRepository` port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NotificationRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            NotificationRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> NotificationRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    super::diesel_helpers::log_diesel_error(&error, "notifications");
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            NotificationRepositoryError::connection("database connection error")
        }
        _ => NotificationRepositoryError::query("database error"),
    }
}

fn row_to_notification(row: NotificationRow) -> Notification {
    Notification {
        id: NotificationId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        kind: NotificationKind::parse_lossy(&row.kind),
        message: row.message,
        read: row.read,
        created_at: row.created_at,
    }
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(
        &self,
        notification: &Notification,
    ) -> Result<(), NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let record = NewNotificationRow {
            id: *notification.id.as_uuid(),
            user_id: *notification.user_id.as_uuid(),
            kind: notification.kind.as_str(),
            message: &notification.message,
            read: notification.read,
            created_at: notification.created_at,
        };
        diesel::insert_into(notifications::table)
            .values(&record)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<NotificationRow> = notifications::table
            .filter(notifications::user_id.eq(user_id.as_uuid()))
            .order(notifications::created_at.desc())
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_notification).collect())
    }

    async fn mark_read(
        &self,
        user_id: &UserId,
        notification_id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // The user filter keeps one user from acknowledging another's rows.
        let row: Option<NotificationRow> = diesel::update(
            notifications::table
                .find(notification_id.as_uuid())
                .filter(notifications::user_id.eq(user_id.as_uuid())),
        )
        .set(notifications::read.eq(true))
        .returning(NotificationRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        Ok(row.map(row_to_notification))
    }
}
