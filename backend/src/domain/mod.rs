//! Domain primitives, aggregates, and use-case services.
//!
//! Purpose: Define strongly typed entities, the ports through which the
//! domain reaches driven adapters, and the services that implement the
//! application's use-cases. Keep invariants and serialisation contracts
//! (serde) documented in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode — transport-agnostic error payload.
//! - Username, Profile, Link, Notification, Tip, Payment — aggregates.
//! - PaymentSimulator — in-process mock of the Pi payment lifecycle.
//! - ports — repository, gateway, and publisher traits.
//! - *Service types — use-cases wired over the ports.

pub mod error;
pub mod events;
pub mod link_service;
pub mod links;
pub mod notification_service;
pub mod notifications;
pub mod payment;
pub mod payment_service;
pub mod payment_simulator;
pub mod ports;
pub mod profile;
pub mod profile_service;
pub mod tips;
pub mod username;
pub mod username_service;

pub use self::error::{Error, ErrorCode};
pub use self::events::{ChangeAction, ChangeEvent, RecordKind};
pub use self::link_service::LinkService;
pub use self::links::{Link, LinkChanges, LinkId, NewLink};
pub use self::notification_service::NotificationService;
pub use self::notifications::{Notification, NotificationId, NotificationKind};
pub use self::payment::{NewPayment, Payment, PaymentError, PaymentId, PaymentStatus};
pub use self::payment_service::PaymentService;
pub use self::payment_simulator::{PaymentSimulator, SimulatorConfig};
pub use self::profile::{Profile, ProfileChanges, UserId};
pub use self::profile_service::ProfileService;
pub use self::tips::{Tip, TipId};
pub use self::username::{Username, UsernameError};
pub use self::username_service::{
    SmallRngSuggestions, SuggestionRng, UsernameCheck, UsernameService,
};

/// Convenient API result alias.
pub type ApiResult<T> = Result<T, Error>;
