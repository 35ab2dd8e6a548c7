//! PostgreSQL-backed `LinkRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{LinkRepository, LinkRepositoryError};
use crate::domain::{Link, LinkId, UserId};

use super::models::{LinkRow, LinkUpdate, NewLinkRow};
use super::pool::{DbPool, PoolError};
use super::schema::links;

/// Diesel-backed implementation of the `LinkRepository` port.
#[derive(Clone)]
pub struct DieselLinkRepository {
    pool: DbPool,
}

impl DieselLinkRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LinkRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            LinkRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> LinkRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    super::diesel_helpers::log_diesel_error(&error, "links");
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            LinkRepositoryError::connection("database connection error")
        }
        _ => LinkRepositoryError::query("database error"),
    }
}

fn row_to_link(row: LinkRow) -> Link {
    Link {
        id: LinkId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        title: row.title,
        url: row.url,
        position: row.position,
        is_active: row.is_active,
        clicks: row.clicks,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[async_trait]
impl LinkRepository for DieselLinkRepository {
    async fn find(&self, link_id: &LinkId) -> Result<Option<Link>, LinkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<LinkRow> = links::table
            .find(link_id.as_uuid())
            .select(LinkRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_link))
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Link>, LinkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<LinkRow> = links::table
            .filter(links::user_id.eq(user_id.as_uuid()))
            .order(links::position.asc())
            .select(LinkRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_link).collect())
    }

    async fn insert(&self, link: &Link) -> Result<(), LinkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let record = NewLinkRow {
            id: *link.id.as_uuid(),
            user_id: *link.user_id.as_uuid(),
            title: &link.title,
            url: &link.url,
            position: link.position,
            is_active: link.is_active,
            clicks: link.clicks,
            created_at: link.created_at,
            updated_at: link.updated_at,
        };
        diesel::insert_into(links::table)
            .values(&record)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, link: &Link) -> Result<bool, LinkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = LinkUpdate {
            title: &link.title,
            url: &link.url,
            position: link.position,
            is_active: link.is_active,
            updated_at: link.updated_at,
        };
        let affected = diesel::update(links::table.find(link.id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn delete(&self, link_id: &LinkId) -> Result<bool, LinkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::delete(links::table.find(link_id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn record_click(&self, link_id: &LinkId) -> Result<Option<Link>, LinkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Single atomic increment; concurrent clicks never lose counts.
        let row: Option<LinkRow> = diesel::update(links::table.find(link_id.as_uuid()))
            .set(links::clicks.eq(links::clicks + 1))
            .returning(LinkRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_link))
    }
}
