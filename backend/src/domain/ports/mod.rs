//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the Postgres store, the in-memory mock store, payment gateways, the
//! realtime hub). Each trait exposes strongly typed errors so adapters map
//! their failures into predictable variants.

mod change_publisher;
mod link_repository;
mod notification_repository;
mod payment_gateway;
mod profile_repository;
mod tip_repository;

pub use change_publisher::{ChangePublisher, NoopChangePublisher};
#[cfg(test)]
pub use link_repository::MockLinkRepository;
pub use link_repository::{FixtureLinkRepository, LinkRepository, LinkRepositoryError};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationRepository, NotificationRepositoryError};
pub use payment_gateway::{
    NoopPaymentCallbacks, PaymentCallbacks, PaymentGateway, PaymentRequest,
};
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
pub use profile_repository::{
    FixtureProfileRepository, ProfileRepository, ProfileRepositoryError,
};
#[cfg(test)]
pub use tip_repository::MockTipRepository;
pub use tip_repository::{TipRepository, TipRepositoryError};
