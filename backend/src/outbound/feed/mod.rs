//! Realtime change-feed adapter.

mod hub;

pub use hub::{ChangeFeed, ChangeHub};
