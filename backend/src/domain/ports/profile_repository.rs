//! Port for profile persistence.

use async_trait::async_trait;

use crate::domain::{Error, Profile, UserId};

/// Errors raised by profile repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileRepositoryError {
    /// Repository connection could not be established.
    #[error("profile repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("profile repository query failed: {message}")]
    Query { message: String },
    /// The username is already taken by another profile.
    #[error("username {username} is already taken")]
    DuplicateUsername { username: String },
}

impl ProfileRepositoryError {
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

    pub fn duplicate_username(username: impl Into<String>) -> Self {
        Self::DuplicateUsername {
            username: username.into(),
        }
    }
}

impl From<ProfileRepositoryError> for Error {
    fn from(value: ProfileRepositoryError) -> Self {
        match value {
            ProfileRepositoryError::Connection { message } => {
                Self::service_unavailable(format!("profile store unavailable: {message}"))
            }
            ProfileRepositoryError::Query { message } => {
                Self::internal(format!("profile store error: {message}"))
            }
            ProfileRepositoryError::DuplicateUsername { username } => {
                Self::conflict(format!("username {username} is already taken"))
            }
        }
    }
}

/// Port for profile storage and retrieval.
///
/// Username lookups are case-insensitive: callers pass the lowercased form
/// and adapters compare against the lowercased stored handle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch a profile by owner id.
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Profile>, ProfileRepositoryError>;

    /// Fetch the profile whose handle matches `username_lower`
    /// case-insensitively.
    async fn find_by_username_lower(
        &self,
        username_lower: &str,
    ) -> Result<Option<Profile>, ProfileRepositoryError>;

    /// Insert or replace a profile keyed by its owner id.
    async fn upsert(&self, profile: &Profile) -> Result<(), ProfileRepositoryError>;
}

/// Fixture implementation backed by nothing: lookups miss, writes succeed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProfileRepository;

#[async_trait]
impl ProfileRepository for FixtureProfileRepository {
    async fn find_by_user_id(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(None)
    }

    async fn find_by_username_lower(
        &self,
        _username_lower: &str,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(None)
    }

    async fn upsert(&self, _profile: &Profile) -> Result<(), ProfileRepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, Username};
    use rstest::rstest;

    #[tokio::test]
    async fn fixture_lookups_miss() {
        let repo = FixtureProfileRepository;
        assert!(
            repo.find_by_user_id(&UserId::random())
                .await
                .expect("ok")
                .is_none()
        );
        assert!(
            repo.find_by_username_lower("anyone")
                .await
                .expect("ok")
                .is_none()
        );
    }

    #[tokio::test]
    async fn fixture_accepts_writes() {
        let repo = FixtureProfileRepository;
        let profile = Profile::new(
            UserId::random(),
            Username::new("tester").expect("valid"),
            "Tester",
        )
        .expect("valid");
        repo.upsert(&profile).await.expect("ok");
    }

    #[rstest]
    #[case(ProfileRepositoryError::connection("down"), ErrorCode::ServiceUnavailable)]
    #[case(ProfileRepositoryError::query("bad sql"), ErrorCode::InternalError)]
    #[case(ProfileRepositoryError::duplicate_username("taken"), ErrorCode::Conflict)]
    fn errors_map_to_domain_codes(
        #[case] error: ProfileRepositoryError,
        #[case] code: ErrorCode,
    ) {
        let domain: Error = error.into();
        assert_eq!(domain.code(), code);
    }
}
