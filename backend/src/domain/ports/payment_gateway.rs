//! Payment gateway seam.
//!
//! The Pi browser SDK drives payments through four named callbacks. Both
//! gateway adapters (the simulator-backed one and the Pi platform client)
//! expose that identical callback shape, so the calling service is
//! indistinguishable between environments.

use async_trait::async_trait;

use crate::domain::{Error, NewPayment, Payment, PaymentId};

/// Observer invoked at each phase boundary of a payment.
///
/// Implementations must tolerate being called from any order of terminal
/// callbacks (`cancelled`/`errored`); a given payment sees at most one
/// terminal callback.
#[async_trait]
pub trait PaymentCallbacks: Send + Sync {
    /// The payment exists and awaits server approval.
    async fn ready_for_server_approval(&self, payment_id: &PaymentId);

    /// The transaction has been submitted and awaits server completion.
    async fn ready_for_server_completion(&self, payment_id: &PaymentId, txid: &str);

    /// The payment was cancelled before completing.
    async fn cancelled(&self, payment_id: &PaymentId);

    /// The payment failed; `payment_id` is absent when creation itself
    /// failed.
    async fn errored(&self, payment_id: Option<&PaymentId>, message: &str);
}

/// Callbacks that ignore every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPaymentCallbacks;

#[async_trait]
impl PaymentCallbacks for NoopPaymentCallbacks {
    async fn ready_for_server_approval(&self, _payment_id: &PaymentId) {}

    async fn ready_for_server_completion(&self, _payment_id: &PaymentId, _txid: &str) {}

    async fn cancelled(&self, _payment_id: &PaymentId) {}

    async fn errored(&self, _payment_id: Option<&PaymentId>, _message: &str) {}
}

/// A payment to drive through a gateway.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub new_payment: NewPayment,
    /// Identifier of a payment already created client-side via the SDK.
    /// Required by the platform gateway, ignored by the simulator.
    pub external_payment_id: Option<PaymentId>,
}

impl PaymentRequest {
    pub fn local(new_payment: NewPayment) -> Self {
        Self {
            new_payment,
            external_payment_id: None,
        }
    }

    pub fn external(new_payment: NewPayment, payment_id: PaymentId) -> Self {
        Self {
            new_payment,
            external_payment_id: Some(payment_id),
        }
    }
}

/// Drives one payment from creation to a terminal state, invoking the
/// callbacks at each phase boundary.
///
/// On success the returned payment is `Completed` with its txid recorded.
/// On failure the matching terminal callback has been invoked before the
/// error is returned.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
        callbacks: &dyn PaymentCallbacks,
    ) -> Result<Payment, Error>;

    /// Look up a payment record held by this gateway.
    async fn get_payment(&self, payment_id: &PaymentId) -> Result<Payment, Error>;
}
