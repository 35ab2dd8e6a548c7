//! Port for link persistence.

use async_trait::async_trait;

use crate::domain::{Error, Link, LinkId, UserId};

/// Errors raised by link repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkRepositoryError {
    /// Repository connection could not be established.
    #[error("link repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("link repository query failed: {message}")]
    Query { message: String },
}

impl LinkRepositoryError {
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

impl From<LinkRepositoryError> for Error {
    fn from(value: LinkRepositoryError) -> Self {
        match value {
            LinkRepositoryError::Connection { message } => {
                Self::service_unavailable(format!("link store unavailable: {message}"))
            }
            LinkRepositoryError::Query { message } => {
                Self::internal(format!("link store error: {message}"))
            }
        }
    }
}

/// Port for link storage. Missing rows surface as `None`/`false`, not as
/// errors; the service layer decides what a miss means.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Fetch one link.
    async fn find(&self, link_id: &LinkId) -> Result<Option<Link>, LinkRepositoryError>;

    /// All links owned by `user_id`, ordered by `position` ascending.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Link>, LinkRepositoryError>;

    /// Insert a new link row.
    async fn insert(&self, link: &Link) -> Result<(), LinkRepositoryError>;

    /// Replace an existing link row. Returns `false` when the row is gone.
    async fn update(&self, link: &Link) -> Result<bool, LinkRepositoryError>;

    /// Delete a link. Returns `false` when the row was already gone.
    async fn delete(&self, link_id: &LinkId) -> Result<bool, LinkRepositoryError>;

    /// Atomically bump the click counter, returning the updated row.
    async fn record_click(&self, link_id: &LinkId) -> Result<Option<Link>, LinkRepositoryError>;
}

/// Fixture implementation backed by nothing: reads miss, writes succeed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLinkRepository;

#[async_trait]
impl LinkRepository for FixtureLinkRepository {
    async fn find(&self, _link_id: &LinkId) -> Result<Option<Link>, LinkRepositoryError> {
        Ok(None)
    }

    async fn list_for_user(&self, _user_id: &UserId) -> Result<Vec<Link>, LinkRepositoryError> {
        Ok(Vec::new())
    }

    async fn insert(&self, _link: &Link) -> Result<(), LinkRepositoryError> {
        Ok(())
    }

    async fn update(&self, _link: &Link) -> Result<bool, LinkRepositoryError> {
        Ok(false)
    }

    async fn delete(&self, _link_id: &LinkId) -> Result<bool, LinkRepositoryError> {
        Ok(false)
    }

    async fn record_click(&self, _link_id: &LinkId) -> Result<Option<Link>, LinkRepositoryError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(LinkRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(LinkRepositoryError::query("broken"), ErrorCode::InternalError)]
    fn errors_map_to_domain_codes(#[case] error: LinkRepositoryError, #[case] code: ErrorCode) {
        let domain: Error = error.into();
        assert_eq!(domain.code(), code);
    }

    #[tokio::test]
    async fn fixture_reads_miss() {
        let repo = FixtureLinkRepository;
        assert!(repo.find(&LinkId::random()).await.expect("ok").is_none());
        assert!(
            repo.list_for_user(&UserId::random())
                .await
                .expect("ok")
                .is_empty()
        );
    }
}
