//! PostgreSQL-backed `ProfileRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProfileRepository, ProfileRepositoryError};
use crate::domain::{Profile, UserId, Username};

use super::diesel_helpers::lower;
use super::models::{ProfileRow, ProfileUpsert};
use super::pool::{DbPool, PoolError};
use super::schema::profiles;

/// Diesel-backed implementation of the `ProfileRepository` port.
///
/// Case-insensitive handle lookups go through `lower(username)`, matching
/// the functional unique index on that expression.
#[derive(Clone)]
pub struct DieselProfileRepository {
    pool: DbPool,
}

impl DieselProfileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProfileRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            ProfileRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error, username: &str) -> ProfileRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    super::diesel_helpers::log_diesel_error(&error, "profiles");
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ProfileRepositoryError::duplicate_username(username)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ProfileRepositoryError::connection("database connection error")
        }
        _ => ProfileRepositoryError::query("database error"),
    }
}

fn row_to_profile(row: ProfileRow) -> Result<Profile, ProfileRepositoryError> {
    let username = Username::new(row.username)
        .map_err(|err| ProfileRepositoryError::query(format!("stored username invalid: {err}")))?;
    Ok(Profile {
        user_id: UserId::from_uuid(row.user_id),
        username,
        display_name: row.display_name,
        bio: row.bio,
        avatar_url: row.avatar_url,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl ProfileRepository for DieselProfileRepository {
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProfileRow> = profiles::table
            .find(user_id.as_uuid())
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, ""))?;

        row.map(row_to_profile).transpose()
    }

    async fn find_by_username_lower(
        &self,
        username_lower: &str,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProfileRow> = profiles::table
            .filter(lower(profiles::username).eq(username_lower))
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, username_lower))?;

        row.map(row_to_profile).transpose()
    }

    async fn upsert(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let record = ProfileUpsert {
            user_id: *profile.user_id.as_uuid(),
            username: profile.username.as_str(),
            display_name: &profile.display_name,
            bio: profile.bio.as_deref(),
            avatar_url: profile.avatar_url.as_deref(),
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        };
        diesel::insert_into(profiles::table)
            .values(&record)
            .on_conflict(profiles::user_id)
            .do_update()
            .set(&record)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, profile.username.as_str()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;
    use uuid::Uuid;

    fn db_error(kind: DatabaseErrorKind) -> DieselError {
        DieselError::DatabaseError(kind, Box::new("boom".to_owned()))
    }

    #[rstest]
    fn unique_violation_maps_to_duplicate_username() {
        let mapped = map_diesel_error(db_error(DatabaseErrorKind::UniqueViolation), "casey");
        assert!(matches!(
            mapped,
            ProfileRepositoryError::DuplicateUsername { .. }
        ));
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let mapped = map_diesel_error(db_error(DatabaseErrorKind::ClosedConnection), "casey");
        assert!(matches!(mapped, ProfileRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn other_errors_map_to_query_error() {
        let mapped = map_diesel_error(DieselError::NotFound, "casey");
        assert!(matches!(mapped, ProfileRepositoryError::Query { .. }));
    }

    #[rstest]
    fn pool_failures_map_to_connection_error() {
        let mapped = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(mapped, ProfileRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn rows_with_invalid_stored_handles_are_rejected() {
        let row = ProfileRow {
            user_id: Uuid::new_v4(),
            username: "bad handle".to_owned(),
            display_name: "Casey".to_owned(),
            bio: None,
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches!(
            row_to_profile(row),
            Err(ProfileRepositoryError::Query { .. })
        ));
    }
}
