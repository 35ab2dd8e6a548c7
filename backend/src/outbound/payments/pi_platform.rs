//! Reqwest-backed Pi platform gateway adapter.
//!
//! This adapter owns transport details only: request serialisation, HTTP
//! error mapping, and JSON decoding of the platform's payment DTO. The
//! payment itself is created client-side by the Pi browser SDK; this
//! adapter performs the server-side approve and complete calls against
//! `/v2/payments/{id}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use crate::domain::ports::{PaymentCallbacks, PaymentGateway, PaymentRequest};
use crate::domain::{Error, Payment, PaymentId, PaymentStatus};

const DEFAULT_BASE_URL: &str = "https://api.minepi.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Payment DTO returned by the Pi platform API.
#[derive(Debug, Deserialize)]
struct PiPaymentDto {
    identifier: String,
    #[serde(default)]
    amount: f64,
    #[serde(default)]
    memo: Option<String>,
    /// Developer-set metadata; the tipping flow round-trips the Droplink
    /// user ids and plan through it.
    #[serde(default)]
    metadata: Option<PiMetadataDto>,
    #[serde(default)]
    transaction: Option<PiTransactionDto>,
    #[serde(default)]
    status: Option<PiStatusDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PiMetadataDto {
    #[serde(default)]
    plan_id: Option<String>,
    #[serde(default)]
    plan_name: Option<String>,
    #[serde(default)]
    user_address: Option<String>,
    #[serde(default)]
    from_user_id: Option<uuid::Uuid>,
    #[serde(default)]
    to_user_id: Option<uuid::Uuid>,
}

#[derive(Debug, Deserialize)]
struct PiTransactionDto {
    txid: String,
}

#[derive(Debug, Default, Deserialize)]
struct PiStatusDto {
    #[serde(default)]
    developer_approved: bool,
    #[serde(default)]
    developer_completed: bool,
    #[serde(default)]
    cancelled: bool,
    #[serde(default)]
    user_cancelled: bool,
}

/// Gateway adapter that drives payments through the Pi platform REST API.
pub struct PiPlatformGateway {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl PiPlatformGateway {
    /// Build an adapter against the production Pi platform endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        let base_url = Url::parse(DEFAULT_BASE_URL)
            .map_err(|err| Error::internal(format!("invalid platform base URL: {err}")))?;
        Self::with_base_url(api_key, base_url)
    }

    /// Build an adapter against an explicit base URL, for sandbox use.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_base_url(api_key: impl Into<String>, base_url: Url) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|err| Error::internal(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    fn payment_url(&self, payment_id: &PaymentId, action: Option<&str>) -> Result<Url, Error> {
        let mut path = format!("/v2/payments/{}", payment_id.as_str());
        if let Some(action) = action {
            path.push('/');
            path.push_str(action);
        }
        self.base_url
            .join(&path)
            .map_err(|err| Error::internal(format!("invalid platform URL: {err}")))
    }

    async fn post_action(
        &self,
        payment_id: &PaymentId,
        action: &str,
        body: &serde_json::Value,
    ) -> Result<PiPaymentDto, Error> {
        let url = self.payment_url(payment_id, Some(action))?;
        let response = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_payment(response).await
    }

    async fn fetch_payment(&self, payment_id: &PaymentId) -> Result<PiPaymentDto, Error> {
        let url = self.payment_url(payment_id, None)?;
        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_payment(response).await
    }

    fn auth_header(&self) -> String {
        format!("Key {}", self.api_key)
    }

    async fn drive(
        &self,
        payment_id: &PaymentId,
        request: &PaymentRequest,
        callbacks: &dyn PaymentCallbacks,
    ) -> Result<Payment, Error> {
        callbacks.ready_for_server_approval(payment_id).await;
        self.post_action(payment_id, "approve", &serde_json::json!({}))
            .await?;
        debug!(payment_id = %payment_id, "platform payment approved");

        // The txid appears once the client submits the blockchain
        // transaction; fetch it back from the platform record.
        let fetched = self.fetch_payment(payment_id).await?;
        let txid = fetched
            .transaction
            .map(|tx| tx.txid)
            .ok_or_else(|| Error::conflict("payment has no transaction to complete"))?;
        callbacks
            .ready_for_server_completion(payment_id, &txid)
            .await;

        let completed = self
            .post_action(payment_id, "complete", &serde_json::json!({ "txid": txid.clone() }))
            .await?;
        debug!(payment_id = %completed.identifier, "platform payment completed");

        let mut payment =
            Payment::from_request(&request.new_payment, PaymentId::new(completed.identifier));
        payment.status = PaymentStatus::Completed;
        payment.txid = Some(txid);
        Ok(payment)
    }
}

#[async_trait]
impl PaymentGateway for PiPlatformGateway {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
        callbacks: &dyn PaymentCallbacks,
    ) -> Result<Payment, Error> {
        request.new_payment.validate().map_err(Error::from)?;
        let Some(payment_id) = request.external_payment_id.clone() else {
            let error = Error::invalid_request(
                "paymentId from the Pi SDK is required for platform payments",
            );
            callbacks.errored(None, &error.to_string()).await;
            return Err(error);
        };

        match self.drive(&payment_id, request, callbacks).await {
            Ok(payment) => Ok(payment),
            Err(err) => {
                callbacks.errored(Some(&payment_id), &err.to_string()).await;
                Err(err)
            }
        }
    }

    async fn get_payment(&self, payment_id: &PaymentId) -> Result<Payment, Error> {
        let dto = self.fetch_payment(payment_id).await?;
        dto_to_payment(dto)
    }
}

/// Rebuild a domain payment from the platform record. Requires the
/// Droplink metadata written when the payment was created client-side.
fn dto_to_payment(dto: PiPaymentDto) -> Result<Payment, Error> {
    use crate::domain::{NewPayment, UserId};

    let metadata = dto
        .metadata
        .ok_or_else(|| Error::internal("platform payment lacks Droplink metadata"))?;
    let (Some(from_user_id), Some(to_user_id)) = (metadata.from_user_id, metadata.to_user_id)
    else {
        return Err(Error::internal("platform payment metadata lacks user ids"));
    };

    let new_payment = NewPayment {
        plan_id: metadata.plan_id.unwrap_or_default(),
        plan_name: metadata.plan_name.unwrap_or_default(),
        amount: dto.amount,
        user_address: metadata.user_address.unwrap_or_default(),
        from_user_id: UserId::from_uuid(from_user_id),
        to_user_id: UserId::from_uuid(to_user_id),
        memo: dto.memo,
    };
    let mut payment = Payment::from_request(&new_payment, PaymentId::new(dto.identifier));
    let status = dto.status.unwrap_or_default();
    payment.status = if status.cancelled || status.user_cancelled {
        PaymentStatus::Cancelled
    } else if status.developer_completed {
        PaymentStatus::Completed
    } else if status.developer_approved {
        PaymentStatus::Approved
    } else {
        PaymentStatus::Created
    };
    payment.txid = dto.transaction.map(|tx| tx.txid);
    Ok(payment)
}

fn map_transport_error(error: reqwest::Error) -> Error {
    Error::service_unavailable(format!("Pi platform unreachable: {error}"))
}

async fn decode_payment(response: reqwest::Response) -> Result<PiPaymentDto, Error> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!(%status, body, "platform request rejected");
        return Err(map_status_error(status));
    }
    response
        .json()
        .await
        .map_err(|err| Error::internal(format!("invalid platform payload: {err}")))
}

fn map_status_error(status: StatusCode) -> Error {
    match status {
        StatusCode::NOT_FOUND => Error::not_found("payment not found on the Pi platform"),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            Error::invalid_request("Pi platform rejected the payment request")
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::internal("Pi platform rejected the server credentials")
        }
        status if status.is_server_error() => {
            Error::service_unavailable("Pi platform is unavailable")
        }
        _ => Error::internal(format!("unexpected Pi platform response: {status}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatusCode::NOT_FOUND, crate::domain::ErrorCode::NotFound)]
    #[case(StatusCode::BAD_REQUEST, crate::domain::ErrorCode::InvalidRequest)]
    #[case(StatusCode::BAD_GATEWAY, crate::domain::ErrorCode::ServiceUnavailable)]
    #[case(StatusCode::UNAUTHORIZED, crate::domain::ErrorCode::InternalError)]
    fn platform_statuses_map_to_domain_codes(
        #[case] status: StatusCode,
        #[case] code: crate::domain::ErrorCode,
    ) {
        assert_eq!(map_status_error(status).code(), code);
    }

    #[rstest]
    fn payment_urls_nest_actions_under_the_payment() {
        let gateway = PiPlatformGateway::new("secret").expect("client");
        let id = PaymentId::new("pay_abc");
        let url = gateway.payment_url(&id, Some("approve")).expect("url");
        assert_eq!(url.as_str(), "https://api.minepi.com/v2/payments/pay_abc/approve");
        let bare = gateway.payment_url(&id, None).expect("url");
        assert_eq!(bare.as_str(), "https://api.minepi.com/v2/payments/pay_abc");
    }

    #[rstest]
    fn platform_record_rebuilds_a_domain_payment() {
        let dto: PiPaymentDto = serde_json::from_value(serde_json::json!({
            "identifier": "pay_abc",
            "amount": 3.5,
            "memo": "thanks",
            "metadata": {
                "planId": "tip",
                "planName": "Tip",
                "userAddress": "wallet",
                "fromUserId": uuid::Uuid::new_v4(),
                "toUserId": uuid::Uuid::new_v4(),
            },
            "transaction": { "txid": "txid_1" },
            "status": { "developer_approved": true, "developer_completed": true },
        }))
        .expect("decodes");

        let payment = dto_to_payment(dto).expect("maps");
        assert_eq!(payment.payment_id.as_str(), "pay_abc");
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.txid.as_deref(), Some("txid_1"));
        assert_eq!(payment.amount, 3.5);
    }

    #[rstest]
    fn platform_record_without_metadata_is_an_internal_error() {
        let dto: PiPaymentDto = serde_json::from_value(serde_json::json!({
            "identifier": "pay_abc",
        }))
        .expect("decodes");

        let error = dto_to_payment(dto).expect_err("rejected");
        assert_eq!(error.code(), crate::domain::ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn missing_sdk_payment_id_is_rejected_before_any_request() {
        use crate::domain::ports::NoopPaymentCallbacks;
        use crate::domain::{NewPayment, UserId};

        let gateway = PiPlatformGateway::new("secret").expect("client");
        let request = PaymentRequest::local(NewPayment {
            plan_id: "tip".into(),
            plan_name: "Tip".into(),
            amount: 1.0,
            user_address: "wallet".into(),
            from_user_id: UserId::random(),
            to_user_id: UserId::random(),
            memo: None,
        });

        let error = gateway
            .create_payment(&request, &NoopPaymentCallbacks)
            .await
            .expect_err("rejected");
        assert_eq!(error.code(), crate::domain::ErrorCode::InvalidRequest);
    }
}
