//! PostgreSQL-backed `TipRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TipRepository, TipRepositoryError};
use crate::domain::{PaymentId, Tip, TipId, UserId};

use super::models::{NewTipRow, TipRow};
use super::pool::{DbPool, PoolError};
use super::schema::tips;

/// Diesel-backed implementation of the `TipRepository` port.
#[derive(Clone)]
pub struct DieselTipRepository {
    pool: DbPool,
}

impl DieselTipRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TipRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            TipRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> TipRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    super::diesel_helpers::log_diesel_error(&error, "tips");
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            TipRepositoryError::connection("database connection error")
        }
        _ => TipRepositoryError::query("database error"),
    }
}

fn row_to_tip(row: TipRow) -> Tip {
    Tip {
        id: TipId::from_uuid(row.id),
        from_user_id: UserId::from_uuid(row.from_user_id),
        to_user_id: UserId::from_uuid(row.to_user_id),
        amount: row.amount,
        memo: row.memo,
        payment_id: PaymentId::new(row.payment_id),
        created_at: row.created_at,
    }
}

#[async_trait]
impl TipRepository for DieselTipRepository {
    async fn insert(&self, tip: &Tip) -> Result<(), TipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let record = NewTipRow {
            id: *tip.id.as_uuid(),
            from_user_id: *tip.from_user_id.as_uuid(),
            to_user_id: *tip.to_user_id.as_uuid(),
            amount: tip.amount,
            memo: tip.memo.as_deref(),
            payment_id: tip.payment_id.as_str(),
            created_at: tip.created_at,
        };
        diesel::insert_into(tips::table)
            .values(&record)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn list_received(&self, user_id: &UserId) -> Result<Vec<Tip>, TipRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TipRow> = tips::table
            .filter(tips::to_user_id.eq(user_id.as_uuid()))
            .order(tips::created_at.desc())
            .select(TipRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_tip).collect())
    }
}
