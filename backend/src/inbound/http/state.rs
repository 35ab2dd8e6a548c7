//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services over dynamic ports and remain testable
//! without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ChangePublisher, LinkRepository, NotificationRepository, PaymentGateway, ProfileRepository,
    TipRepository,
};
use crate::domain::{
    LinkService, NotificationService, PaymentService, ProfileService, SmallRngSuggestions,
    UsernameService,
};

/// Parameter object bundling the ports the HTTP state is composed from.
pub struct HttpStatePorts {
    pub profiles: Arc<dyn ProfileRepository>,
    pub links: Arc<dyn LinkRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub tips: Arc<dyn TipRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub publisher: Arc<dyn ChangePublisher>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub usernames: Arc<UsernameService<dyn ProfileRepository>>,
    pub profiles: Arc<ProfileService<dyn ProfileRepository>>,
    pub links: Arc<LinkService<dyn LinkRepository>>,
    pub notifications: Arc<NotificationService<dyn NotificationRepository>>,
    pub payments: Arc<PaymentService<dyn TipRepository, dyn NotificationRepository>>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self {
            usernames: Arc::new(UsernameService::new(
                Arc::clone(&ports.profiles),
                Arc::new(SmallRngSuggestions::from_entropy()),
            )),
            profiles: Arc::new(ProfileService::new(
                ports.profiles,
                Arc::clone(&ports.publisher),
            )),
            links: Arc::new(LinkService::new(
                ports.links,
                Arc::clone(&ports.publisher),
            )),
            notifications: Arc::new(NotificationService::new(
                Arc::clone(&ports.notifications),
                Arc::clone(&ports.publisher),
            )),
            payments: Arc::new(PaymentService::new(
                ports.gateway,
                ports.tips,
                ports.notifications,
                ports.publisher,
            )),
        }
    }
}
