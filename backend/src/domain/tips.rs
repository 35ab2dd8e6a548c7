//! Tips: completed Pi payments from a visitor to a profile owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::Error;
use super::payment::PaymentId;
use super::profile::UserId;

/// Stable tip identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TipId(Uuid);

impl TipId {
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for TipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A recorded tip. Only written once the backing payment reached
/// `Completed`; the `payment_id` ties the row back to the payment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    pub id: TipId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    /// Amount in Pi.
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub payment_id: PaymentId,
    pub created_at: DateTime<Utc>,
}

impl Tip {
    /// Record a tip for a completed payment.
    pub fn new(
        from_user_id: UserId,
        to_user_id: UserId,
        amount: f64,
        memo: Option<String>,
        payment_id: PaymentId,
    ) -> Result<Self, Error> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::invalid_request("tip amount must be positive"));
        }
        Ok(Self {
            id: TipId::random(),
            from_user_id,
            to_user_id,
            amount,
            memo,
            payment_id,
            created_at: Utc::now(),
        })
    }
}
