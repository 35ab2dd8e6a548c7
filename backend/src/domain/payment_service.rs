//! Tipping use-case: drive a payment through the gateway and record the
//! outcome.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::error::Error;
use super::events::{ChangeEvent, RecordKind};
use super::notifications::{Notification, NotificationKind};
use super::payment::{Payment, PaymentId};
use super::ports::{
    ChangePublisher, NotificationRepository, PaymentCallbacks, PaymentGateway, PaymentRequest,
    TipRepository,
};
use super::profile::UserId;
use super::tips::Tip;

/// Callbacks that log each phase boundary.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCallbacks;

#[async_trait::async_trait]
impl PaymentCallbacks for TracingCallbacks {
    async fn ready_for_server_approval(&self, payment_id: &PaymentId) {
        info!(payment_id = %payment_id, "payment ready for server approval");
    }

    async fn ready_for_server_completion(&self, payment_id: &PaymentId, txid: &str) {
        info!(payment_id = %payment_id, txid, "payment ready for server completion");
    }

    async fn cancelled(&self, payment_id: &PaymentId) {
        warn!(payment_id = %payment_id, "payment cancelled");
    }

    async fn errored(&self, payment_id: Option<&PaymentId>, message: &str) {
        match payment_id {
            Some(id) => warn!(payment_id = %id, message, "payment errored"),
            None => warn!(message, "payment creation errored"),
        }
    }
}

/// Tipping use-cases over a [`PaymentGateway`] and the stores that record
/// its outcomes.
pub struct PaymentService<T: ?Sized, N: ?Sized> {
    gateway: Arc<dyn PaymentGateway>,
    tips: Arc<T>,
    notifications: Arc<N>,
    publisher: Arc<dyn ChangePublisher>,
}

impl<T: ?Sized, N: ?Sized> PaymentService<T, N> {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        tips: Arc<T>,
        notifications: Arc<N>,
        publisher: Arc<dyn ChangePublisher>,
    ) -> Self {
        Self {
            gateway,
            tips,
            notifications,
            publisher,
        }
    }
}

impl<T: TipRepository + ?Sized, N: NotificationRepository + ?Sized> PaymentService<T, N> {
    /// Drive a tip payment to completion, then record the tip and notify
    /// the recipient.
    ///
    /// The gateway owns the payment lifecycle; a failed payment surfaces
    /// here as an error after its terminal callback has fired, and nothing
    /// is recorded for it.
    pub async fn send_tip(&self, request: PaymentRequest) -> Result<Payment, Error> {
        let payment = self
            .gateway
            .create_payment(&request, &TracingCallbacks)
            .await?;

        let tip = Tip::new(
            payment.from_user_id,
            payment.to_user_id,
            payment.amount,
            payment.memo.clone(),
            payment.payment_id.clone(),
        )?;
        if let Err(err) = self.tips.insert(&tip).await {
            // The payment already completed; the caller still needs to know
            // the record is missing.
            error!(payment_id = %payment.payment_id, %err, "completed tip could not be recorded");
            return Err(err.into());
        }
        self.publisher
            .publish(ChangeEvent::insert(tip.to_user_id, RecordKind::Tip, &tip));

        let notification = Notification::new(
            payment.to_user_id,
            NotificationKind::TipReceived,
            format!("You received a tip of {} Pi", payment.amount),
        );
        if let Err(err) = self.notifications.insert(&notification).await {
            // Non-fatal: the tip itself is safely recorded.
            warn!(payment_id = %payment.payment_id, %err, "tip notification not stored");
        } else {
            self.publisher.publish(ChangeEvent::insert(
                notification.user_id,
                RecordKind::Notification,
                &notification,
            ));
        }

        self.publisher.publish(ChangeEvent::insert(
            payment.from_user_id,
            RecordKind::Payment,
            &payment,
        ));
        info!(
            payment_id = %payment.payment_id,
            from = %payment.from_user_id,
            to = %payment.to_user_id,
            amount = payment.amount,
            "tip completed",
        );
        Ok(payment)
    }

    /// Tips received by a user, newest first.
    pub async fn tips_received(&self, user_id: &UserId) -> Result<Vec<Tip>, Error> {
        Ok(self.tips.list_received(user_id).await?)
    }

    /// Look up a payment record via the active gateway.
    pub async fn get_payment(&self, payment_id: &PaymentId) -> Result<Payment, Error> {
        self.gateway.get_payment(payment_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::NewPayment;
    use crate::domain::payment_simulator::{PaymentSimulator, SimulatorConfig};
    use crate::domain::ports::{
        MockNotificationRepository, MockTipRepository, NoopChangePublisher, TipRepositoryError,
    };
    use crate::domain::{ErrorCode, PaymentStatus};
    use crate::outbound::payments::SimulatedGateway;
    use std::time::Duration;

    fn fast_gateway() -> Arc<dyn PaymentGateway> {
        let simulator = PaymentSimulator::new(SimulatorConfig {
            latency: Duration::from_millis(1),
        });
        Arc::new(SimulatedGateway::new(Arc::new(simulator)))
    }

    fn tip_request() -> PaymentRequest {
        PaymentRequest::local(NewPayment {
            plan_id: "tip".into(),
            plan_name: "Tip".into(),
            amount: 2.5,
            user_address: "wallet".into(),
            from_user_id: UserId::random(),
            to_user_id: UserId::random(),
            memo: Some("thanks!".into()),
        })
    }

    fn service(
        tips: MockTipRepository,
        notifications: MockNotificationRepository,
    ) -> PaymentService<MockTipRepository, MockNotificationRepository> {
        PaymentService::new(
            fast_gateway(),
            Arc::new(tips),
            Arc::new(notifications),
            Arc::new(NoopChangePublisher),
        )
    }

    #[tokio::test]
    async fn send_tip_records_tip_and_notification() {
        let mut tips = MockTipRepository::new();
        tips.expect_insert()
            .withf(|tip| tip.amount == 2.5 && tip.memo.as_deref() == Some("thanks!"))
            .times(1)
            .return_once(|_| Ok(()));
        let mut notifications = MockNotificationRepository::new();
        notifications
            .expect_insert()
            .withf(|note| note.kind == NotificationKind::TipReceived && !note.read)
            .times(1)
            .return_once(|_| Ok(()));

        let payment = service(tips, notifications)
            .send_tip(tip_request())
            .await
            .expect("completed");
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert!(payment.txid.is_some());
    }

    #[tokio::test]
    async fn invalid_payment_records_nothing() {
        let mut request = tip_request();
        request.new_payment.amount = -1.0;
        let mut tips = MockTipRepository::new();
        tips.expect_insert().times(0);
        let mut notifications = MockNotificationRepository::new();
        notifications.expect_insert().times(0);

        let error = service(tips, notifications)
            .send_tip(request)
            .await
            .expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn failed_tip_insert_surfaces_after_payment_completes() {
        let mut tips = MockTipRepository::new();
        tips.expect_insert()
            .times(1)
            .return_once(|_| Err(TipRepositoryError::query("disk full")));
        let mut notifications = MockNotificationRepository::new();
        notifications.expect_insert().times(0);

        let error = service(tips, notifications)
            .send_tip(tip_request())
            .await
            .expect_err("surfaced");
        assert_eq!(error.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_the_tip() {
        let mut tips = MockTipRepository::new();
        tips.expect_insert().times(1).return_once(|_| Ok(()));
        let mut notifications = MockNotificationRepository::new();
        notifications
            .expect_insert()
            .times(1)
            .return_once(|_| Err(crate::domain::ports::NotificationRepositoryError::query("down")));

        let payment = service(tips, notifications)
            .send_tip(tip_request())
            .await
            .expect("tip still completes");
        assert_eq!(payment.status, PaymentStatus::Completed);
    }
}
