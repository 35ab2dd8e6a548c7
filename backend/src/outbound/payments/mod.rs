//! Payment gateway adapters.
//!
//! Both adapters implement the same [`PaymentGateway`] port with the same
//! callback shape, so the composition root can swap the in-process
//! simulator for the real Pi platform without touching the domain.
//!
//! [`PaymentGateway`]: crate::domain::ports::PaymentGateway

mod pi_platform;
mod simulated;

pub use pi_platform::PiPlatformGateway;
pub use simulated::SimulatedGateway;
