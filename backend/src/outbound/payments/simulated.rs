//! Gateway adapter over the in-process payment simulator.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{PaymentCallbacks, PaymentGateway, PaymentRequest};
use crate::domain::{Error, Payment, PaymentError, PaymentId, PaymentSimulator};

/// Drives payments through the [`PaymentSimulator`], invoking callbacks at
/// the same phase boundaries the Pi browser SDK would.
pub struct SimulatedGateway {
    simulator: Arc<PaymentSimulator>,
}

impl SimulatedGateway {
    pub fn new(simulator: Arc<PaymentSimulator>) -> Self {
        Self { simulator }
    }

    /// Shared access to the underlying simulator, for inspection.
    pub fn simulator(&self) -> &Arc<PaymentSimulator> {
        &self.simulator
    }

    async fn drive(
        &self,
        request: &PaymentRequest,
        callbacks: &dyn PaymentCallbacks,
    ) -> Result<Payment, (Option<PaymentId>, PaymentError)> {
        let created = self
            .simulator
            .create(&request.new_payment)
            .await
            .map_err(|err| (None, err))?;
        let payment_id = created.payment_id.clone();
        callbacks.ready_for_server_approval(&payment_id).await;

        let step = |err| (Some(payment_id.clone()), err);
        self.simulator.approve(&payment_id).await.map_err(step)?;
        let txid = self.simulator.simulated_txid(&payment_id).map_err(step)?;
        callbacks
            .ready_for_server_completion(&payment_id, &txid)
            .await;

        self.simulator
            .complete(&payment_id, &txid)
            .await
            .map_err(step)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
        callbacks: &dyn PaymentCallbacks,
    ) -> Result<Payment, Error> {
        match self.drive(request, callbacks).await {
            Ok(payment) => Ok(payment),
            Err((payment_id, err)) => {
                callbacks
                    .errored(payment_id.as_ref(), &err.to_string())
                    .await;
                Err(err.into())
            }
        }
    }

    async fn get_payment(&self, payment_id: &PaymentId) -> Result<Payment, Error> {
        self.simulator.get(payment_id).map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::NoopPaymentCallbacks;
    use crate::domain::{NewPayment, PaymentStatus, SimulatorConfig, UserId};
    use std::sync::Mutex;
    use std::time::Duration;

    fn gateway() -> SimulatedGateway {
        SimulatedGateway::new(Arc::new(PaymentSimulator::new(SimulatorConfig {
            latency: Duration::from_millis(1),
        })))
    }

    fn request(amount: f64) -> PaymentRequest {
        PaymentRequest::local(NewPayment {
            plan_id: "tip".into(),
            plan_name: "Tip".into(),
            amount,
            user_address: "wallet".into(),
            from_user_id: UserId::random(),
            to_user_id: UserId::random(),
            memo: None,
        })
    }

    /// Records callback invocations in order.
    #[derive(Default)]
    struct RecordingCallbacks {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PaymentCallbacks for RecordingCallbacks {
        async fn ready_for_server_approval(&self, _payment_id: &PaymentId) {
            self.calls.lock().expect("lock").push("approval".into());
        }

        async fn ready_for_server_completion(&self, _payment_id: &PaymentId, txid: &str) {
            self.calls
                .lock()
                .expect("lock")
                .push(format!("completion:{}", !txid.is_empty()));
        }

        async fn cancelled(&self, _payment_id: &PaymentId) {
            self.calls.lock().expect("lock").push("cancelled".into());
        }

        async fn errored(&self, payment_id: Option<&PaymentId>, _message: &str) {
            self.calls
                .lock()
                .expect("lock")
                .push(format!("errored:{}", payment_id.is_some()));
        }
    }

    #[tokio::test]
    async fn successful_payment_fires_both_phase_callbacks_in_order() {
        let callbacks = RecordingCallbacks::default();
        let payment = gateway()
            .create_payment(&request(1.0), &callbacks)
            .await
            .expect("completed");

        assert_eq!(payment.status, PaymentStatus::Completed);
        assert!(payment.txid.is_some());
        assert_eq!(
            *callbacks.calls.lock().expect("lock"),
            vec!["approval".to_owned(), "completion:true".to_owned()],
        );
    }

    #[tokio::test]
    async fn creation_failure_fires_errored_without_a_payment_id() {
        let callbacks = RecordingCallbacks::default();
        gateway()
            .create_payment(&request(-1.0), &callbacks)
            .await
            .expect_err("rejected");

        assert_eq!(
            *callbacks.calls.lock().expect("lock"),
            vec!["errored:false".to_owned()],
        );
    }

    #[tokio::test]
    async fn simulator_is_shared_with_the_caller() {
        let gateway = gateway();
        let payment = gateway
            .create_payment(&request(1.0), &NoopPaymentCallbacks)
            .await
            .expect("completed");

        let stored = gateway
            .simulator()
            .get(&payment.payment_id)
            .expect("stored");
        assert_eq!(stored.status, PaymentStatus::Completed);
    }
}
