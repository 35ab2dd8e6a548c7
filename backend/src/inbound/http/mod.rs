//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod health;
pub mod links;
pub mod notifications;
pub mod payments;
pub mod profiles;
pub mod state;
pub mod usernames;

pub use error::ApiResult;
