//! Port for tip persistence.

use async_trait::async_trait;

use crate::domain::{Error, Tip, UserId};

/// Errors raised by tip repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TipRepositoryError {
    /// Repository connection could not be established.
    #[error("tip repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("tip repository query failed: {message}")]
    Query { message: String },
}

impl TipRepositoryError {
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

impl From<TipRepositoryError> for Error {
    fn from(value: TipRepositoryError) -> Self {
        match value {
            TipRepositoryError::Connection { message } => {
                Self::service_unavailable(format!("tip store unavailable: {message}"))
            }
            TipRepositoryError::Query { message } => {
                Self::internal(format!("tip store error: {message}"))
            }
        }
    }
}

/// Port for tip storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TipRepository: Send + Sync {
    /// Insert a new tip row.
    async fn insert(&self, tip: &Tip) -> Result<(), TipRepositoryError>;

    /// Tips received by `user_id`, newest first.
    async fn list_received(&self, user_id: &UserId) -> Result<Vec<Tip>, TipRepositoryError>;
}

