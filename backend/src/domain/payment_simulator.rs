//! Simulated Pi payment state machine.
//!
//! Stands in for the Pi platform in environments without SDK access. The
//! simulator is an explicit instance constructed and owned by the composition
//! root, not process-wide state: its payment map and latency configuration
//! live on the value, and dropping it discards every in-memory payment.
//!
//! Transitions are asynchronous and sleep a configured artificial latency so
//! calling code exercises the same suspension points as the real platform.
//! At most one transition per payment may be in flight; a second call while
//! one is pending fails fast with [`PaymentError::TransitionInFlight`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::time::sleep;
use tracing::debug;
use uuid::Uuid;

use super::payment::{NewPayment, Payment, PaymentError, PaymentId, PaymentStatus};

/// Tunable behaviour of the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Artificial delay applied to every operation. Behaviour must not
    /// depend on the exact value; tests use `Duration::ZERO`.
    pub latency: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(400),
        }
    }
}

struct Slot {
    payment: Payment,
    /// Placeholder transaction id handed to the completion callback, standing
    /// in for the blockchain transaction a real wallet would submit.
    simulated_txid: String,
    in_flight: bool,
}

/// In-memory payment state machine.
pub struct PaymentSimulator {
    config: SimulatorConfig,
    payments: Mutex<HashMap<PaymentId, Slot>>,
}

impl PaymentSimulator {
    /// Create a simulator with the given configuration.
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            config,
            payments: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PaymentId, Slot>> {
        // The map stays consistent across panics; recover rather than wedge.
        self.payments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a payment in the `Created` state.
    ///
    /// Fails with [`PaymentError::InvalidAmount`] or
    /// [`PaymentError::MissingField`] before any state is allocated.
    pub async fn create(&self, request: &NewPayment) -> Result<Payment, PaymentError> {
        request.validate()?;
        sleep(self.config.latency).await;

        let payment = Payment::from_request(request, PaymentId::random());
        let slot = Slot {
            payment: payment.clone(),
            simulated_txid: format!("txid_{}", Uuid::new_v4().simple()),
            in_flight: false,
        };
        debug!(payment_id = %payment.payment_id, amount = payment.amount, "payment created");
        self.lock().insert(payment.payment_id.clone(), slot);
        Ok(payment)
    }

    /// Approve a payment. Legal only from `Created`.
    pub async fn approve(&self, payment_id: &PaymentId) -> Result<Payment, PaymentError> {
        self.transition(
            payment_id,
            |payment| match payment.status {
                PaymentStatus::Created => Ok(()),
                from => Err(PaymentError::invalid_state(from, "approve")),
            },
            |payment| payment.status = PaymentStatus::Approved,
        )
        .await
    }

    /// Complete a payment with its transaction id. Legal only from
    /// `Approved`; the txid is recorded permanently.
    pub async fn complete(
        &self,
        payment_id: &PaymentId,
        txid: &str,
    ) -> Result<Payment, PaymentError> {
        if txid.trim().is_empty() {
            return Err(PaymentError::missing_field("txid"));
        }
        let txid = txid.to_owned();
        self.transition(
            payment_id,
            |payment| match payment.status {
                PaymentStatus::Approved => Ok(()),
                from => Err(PaymentError::invalid_state(from, "complete")),
            },
            move |payment| {
                payment.status = PaymentStatus::Completed;
                payment.txid = Some(txid);
            },
        )
        .await
    }

    /// Cancel a payment. Legal from `Created` or `Approved`; terminal.
    pub async fn cancel(&self, payment_id: &PaymentId) -> Result<Payment, PaymentError> {
        self.transition(
            payment_id,
            |payment| match payment.status {
                PaymentStatus::Created | PaymentStatus::Approved => Ok(()),
                from => Err(PaymentError::invalid_state(from, "cancel")),
            },
            |payment| payment.status = PaymentStatus::Cancelled,
        )
        .await
    }

    /// Mark a payment failed. Legal from any non-terminal state; terminal.
    pub async fn fail(&self, payment_id: &PaymentId) -> Result<Payment, PaymentError> {
        self.transition(
            payment_id,
            |payment| {
                if payment.status.is_terminal() {
                    Err(PaymentError::invalid_state(payment.status, "fail"))
                } else {
                    Ok(())
                }
            },
            |payment| payment.status = PaymentStatus::Failed,
        )
        .await
    }

    /// Fetch a snapshot of a payment.
    pub fn get(&self, payment_id: &PaymentId) -> Result<Payment, PaymentError> {
        self.lock()
            .get(payment_id)
            .map(|slot| slot.payment.clone())
            .ok_or_else(|| PaymentError::not_found(payment_id))
    }

    /// Placeholder transaction id for a simulated payment, handed to the
    /// completion callback by the simulated gateway.
    pub fn simulated_txid(&self, payment_id: &PaymentId) -> Result<String, PaymentError> {
        self.lock()
            .get(payment_id)
            .map(|slot| slot.simulated_txid.clone())
            .ok_or_else(|| PaymentError::not_found(payment_id))
    }

    async fn transition(
        &self,
        payment_id: &PaymentId,
        check: impl FnOnce(&Payment) -> Result<(), PaymentError>,
        apply: impl FnOnce(&mut Payment),
    ) -> Result<Payment, PaymentError> {
        {
            let mut payments = self.lock();
            let slot = payments
                .get_mut(payment_id)
                .ok_or_else(|| PaymentError::not_found(payment_id))?;
            if slot.in_flight {
                return Err(PaymentError::transition_in_flight(payment_id));
            }
            check(&slot.payment)?;
            slot.in_flight = true;
        }

        let guard = InFlightGuard {
            simulator: self,
            payment_id: payment_id.clone(),
        };
        sleep(self.config.latency).await;

        let updated = {
            let mut payments = self.lock();
            let slot = payments
                .get_mut(payment_id)
                .ok_or_else(|| PaymentError::not_found(payment_id))?;
            apply(&mut slot.payment);
            slot.payment.updated_at = Utc::now();
            slot.payment.clone()
        };
        drop(guard);
        debug!(payment_id = %payment_id, status = %updated.status, "payment transitioned");
        Ok(updated)
    }
}

/// Clears the in-flight flag even when the transition future is dropped
/// mid-sleep, so an abandoned request cannot wedge the payment.
struct InFlightGuard<'a> {
    simulator: &'a PaymentSimulator,
    payment_id: PaymentId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Some(slot) = self.simulator.lock().get_mut(&self.payment_id) {
            slot.in_flight = false;
        }
    }
}
