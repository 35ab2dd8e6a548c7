//! Persistence adapters for the repository ports.
//!
//! Two interchangeable families implement the same ports:
//!
//! - **Diesel adapters**: PostgreSQL via the Diesel ORM with async support
//!   through `diesel-async` and `bb8` connection pooling. Thin adapters
//!   only; row structs (`models.rs`) and table definitions (`schema.rs`)
//!   never leak into the domain.
//! - **In-memory adapters**: mutex-guarded maps with the same observable
//!   behaviour, used for local development and integration tests.
//!
//! The composition root picks one family at startup; nothing else in the
//! codebase knows which is live.

pub(crate) mod diesel_helpers;
mod diesel_link_repository;
mod diesel_notification_repository;
mod diesel_profile_repository;
mod diesel_tip_repository;
mod memory;
mod models;
mod pool;
mod schema;

pub use diesel_link_repository::DieselLinkRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_profile_repository::DieselProfileRepository;
pub use diesel_tip_repository::DieselTipRepository;
pub use memory::{
    InMemoryLinkRepository, InMemoryNotificationRepository, InMemoryProfileRepository,
    InMemoryTipRepository,
};
pub use pool::{DbPool, PoolConfig, PoolError};
