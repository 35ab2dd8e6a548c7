//! Payment lifecycle model.
//!
//! Mirrors the Pi Network three-phase flow: a payment is created, approved by
//! the app server, then completed with the blockchain transaction id. The
//! transitions are one-directional; `Cancelled` and `Failed` are terminal
//! alternates reachable from any non-terminal state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::Error;
use super::profile::UserId;

/// Opaque payment identifier, unique per created payment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    /// Wrap an identifier received from an external gateway.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Allocate a fresh identifier for a locally created payment.
    pub fn random() -> Self {
        Self(format!("pay_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Created,
    Approved,
    Completed,
    Cancelled,
    Failed,
}

impl PaymentStatus {
    /// True for states that admit no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    /// Canonical lower-case name, as used in logs and wire payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Approved => "approved",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by payment transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    /// Payment amount is zero, negative, or not a finite number.
    #[error("payment amount must be a positive number")]
    InvalidAmount,
    /// The attempted transition is not legal from the current state.
    #[error("cannot {attempted} a payment in state {from}")]
    InvalidState {
        from: PaymentStatus,
        attempted: &'static str,
    },
    /// A required field is empty.
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
    /// No payment exists with the given identifier.
    #[error("unknown payment: {payment_id}")]
    NotFound { payment_id: String },
    /// Another transition for this payment is still pending; the state
    /// machine refuses to race rather than serialise concurrent mutation.
    #[error("a transition for payment {payment_id} is already in flight")]
    TransitionInFlight { payment_id: String },
}

impl PaymentError {
    pub fn invalid_state(from: PaymentStatus, attempted: &'static str) -> Self {
        Self::InvalidState { from, attempted }
    }

    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn not_found(payment_id: &PaymentId) -> Self {
        Self::NotFound {
            payment_id: payment_id.to_string(),
        }
    }

    pub fn transition_in_flight(payment_id: &PaymentId) -> Self {
        Self::TransitionInFlight {
            payment_id: payment_id.to_string(),
        }
    }
}

impl From<PaymentError> for Error {
    fn from(value: PaymentError) -> Self {
        match &value {
            PaymentError::InvalidAmount | PaymentError::MissingField { .. } => {
                Self::invalid_request(value.to_string())
            }
            PaymentError::InvalidState { .. } | PaymentError::TransitionInFlight { .. } => {
                Self::conflict(value.to_string())
            }
            PaymentError::NotFound { .. } => Self::not_found(value.to_string()),
        }
    }
}

/// Input for creating a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub plan_id: String,
    pub plan_name: String,
    /// Amount in Pi.
    pub amount: f64,
    /// Wallet address of the paying user.
    pub user_address: String,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl NewPayment {
    /// Check the creation preconditions without allocating any state.
    pub fn validate(&self) -> Result<(), PaymentError> {
        if self.plan_id.trim().is_empty() {
            return Err(PaymentError::missing_field("planId"));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(PaymentError::InvalidAmount);
        }
        Ok(())
    }
}

/// A payment record held by the simulator (or mirrored from the platform).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub payment_id: PaymentId,
    pub plan_id: String,
    pub plan_name: String,
    pub amount: f64,
    pub user_address: String,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub status: PaymentStatus,
    /// Blockchain transaction id; set exactly once, at completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Materialise a validated [`NewPayment`] in the `Created` state.
    pub(crate) fn from_request(request: &NewPayment, payment_id: PaymentId) -> Self {
        let now = Utc::now();
        Self {
            payment_id,
            plan_id: request.plan_id.clone(),
            plan_name: request.plan_name.clone(),
            amount: request.amount,
            user_address: request.user_address.clone(),
            from_user_id: request.from_user_id,
            to_user_id: request.to_user_id,
            memo: request.memo.clone(),
            status: PaymentStatus::Created,
            txid: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn request(amount: f64, plan_id: &str) -> NewPayment {
        NewPayment {
            plan_id: plan_id.into(),
            plan_name: "Tip".into(),
            amount,
            user_address: "GDXXX".into(),
            from_user_id: UserId::random(),
            to_user_id: UserId::random(),
            memo: None,
        }
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.5)]
    #[case(f64::NAN)]
    fn create_precondition_rejects_bad_amounts(#[case] amount: f64) {
        assert_eq!(
            request(amount, "tip").validate(),
            Err(PaymentError::InvalidAmount)
        );
    }

    #[rstest]
    fn create_precondition_rejects_empty_plan() {
        assert_eq!(
            request(1.0, "  ").validate(),
            Err(PaymentError::missing_field("planId"))
        );
    }

    #[rstest]
    #[case(PaymentStatus::Created, false)]
    #[case(PaymentStatus::Approved, false)]
    #[case(PaymentStatus::Completed, true)]
    #[case(PaymentStatus::Cancelled, true)]
    #[case(PaymentStatus::Failed, true)]
    fn terminal_states_are_identified(#[case] status: PaymentStatus, #[case] terminal: bool) {
        assert_eq!(status.is_terminal(), terminal);
    }

    #[rstest]
    fn payment_errors_map_to_domain_codes() {
        use crate::domain::ErrorCode;

        let conflict: Error =
            PaymentError::invalid_state(PaymentStatus::Completed, "approve").into();
        assert_eq!(conflict.code(), ErrorCode::Conflict);

        let invalid: Error = PaymentError::InvalidAmount.into();
        assert_eq!(invalid.code(), ErrorCode::InvalidRequest);

        let missing: Error = PaymentError::missing_field("txid").into();
        assert_eq!(missing.code(), ErrorCode::InvalidRequest);

        let not_found: Error = PaymentError::not_found(&PaymentId::random()).into();
        assert_eq!(not_found.code(), ErrorCode::NotFound);
    }

    #[rstest]
    fn fresh_payment_ids_are_unique() {
        assert_ne!(PaymentId::random(), PaymentId::random());
    }
}
