//! Payment and tip HTTP handlers.
//!
//! ```text
//! POST /api/v1/payments
//! GET  /api/v1/payments/{payment_id}
//! GET  /api/v1/users/{user_id}/tips
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::PaymentRequest;
use crate::domain::{Error, NewPayment, Payment, PaymentId, Tip, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Request payload for sending a tip payment.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub plan_id: String,
    pub plan_name: String,
    /// Amount in Pi.
    pub amount: f64,
    /// Wallet address of the paying user.
    pub user_address: String,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub memo: Option<String>,
    /// Identifier of a payment already created client-side by the Pi SDK.
    /// Required when the platform gateway is active.
    pub payment_id: Option<String>,
}

/// Response payload for a payment record.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub payment_id: String,
    pub plan_id: String,
    pub plan_name: String,
    pub amount: f64,
    pub user_address: String,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Payment> for PaymentResponse {
    fn from(value: Payment) -> Self {
        Self {
            payment_id: value.payment_id.as_str().to_owned(),
            plan_id: value.plan_id,
            plan_name: value.plan_name,
            amount: value.amount,
            user_address: value.user_address,
            from_user_id: *value.from_user_id.as_uuid(),
            to_user_id: *value.to_user_id.as_uuid(),
            memo: value.memo,
            status: value.status.as_str().to_owned(),
            txid: value.txid,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Response payload for a recorded tip.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TipResponse {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub payment_id: String,
    pub created_at: String,
}

impl From<Tip> for TipResponse {
    fn from(value: Tip) -> Self {
        Self {
            id: *value.id.as_uuid(),
            from_user_id: *value.from_user_id.as_uuid(),
            to_user_id: *value.to_user_id.as_uuid(),
            amount: value.amount,
            memo: value.memo,
            payment_id: value.payment_id.as_str().to_owned(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Drive a tip payment through the active gateway and record the outcome.
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Completed payment", body = PaymentResponse),
        (status = 400, description = "Invalid amount or missing field", body = Error),
        (status = 409, description = "Illegal payment state transition", body = Error),
        (status = 503, description = "Payment platform unavailable", body = Error)
    ),
    tags = ["payments"],
    operation_id = "createPayment"
)]
#[post("/payments")]
pub async fn create_payment(
    state: web::Data<HttpState>,
    payload: web::Json<CreatePaymentRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let new_payment = NewPayment {
        plan_id: payload.plan_id,
        plan_name: payload.plan_name,
        amount: payload.amount,
        user_address: payload.user_address,
        from_user_id: UserId::from_uuid(payload.from_user_id),
        to_user_id: UserId::from_uuid(payload.to_user_id),
        memo: payload.memo,
    };
    let request = match payload.payment_id {
        Some(id) => PaymentRequest::external(new_payment, PaymentId::new(id)),
        None => PaymentRequest::local(new_payment),
    };
    let payment = state.payments.send_tip(request).await?;
    Ok(HttpResponse::Created().json(PaymentResponse::from(payment)))
}

/// Fetch one payment record from the active gateway.
#[utoipa::path(
    get,
    path = "/api/v1/payments/{payment_id}",
    params(("payment_id" = String, Path, description = "Payment to look up")),
    responses(
        (status = 200, description = "Payment record", body = PaymentResponse),
        (status = 404, description = "Unknown payment", body = Error)
    ),
    tags = ["payments"],
    operation_id = "getPayment"
)]
#[get("/payments/{payment_id}")]
pub async fn get_payment(
    state: web::Data<HttpState>,
    payment_id: web::Path<String>,
) -> ApiResult<web::Json<PaymentResponse>> {
    let payment = state
        .payments
        .get_payment(&PaymentId::new(payment_id.into_inner()))
        .await?;
    Ok(web::Json(PaymentResponse::from(payment)))
}

/// List the tips a user has received, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/tips",
    params(("user_id" = Uuid, Path, description = "Tip recipient")),
    responses(
        (status = 200, description = "Tips, newest first", body = [TipResponse])
    ),
    tags = ["payments"],
    operation_id = "listReceivedTips"
)]
#[get("/users/{user_id}/tips")]
pub async fn list_tips(
    state: web::Data<HttpState>,
    user_id: web::Path<Uuid>,
) -> ApiResult<web::Json<Vec<TipResponse>>> {
    let tips = state
        .payments
        .tips_received(&UserId::from_uuid(user_id.into_inner()))
        .await?;
    Ok(web::Json(tips.into_iter().map(TipResponse::from).collect()))
}
