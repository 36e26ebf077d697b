//! Withdrawal domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Which earnings pool a withdrawal draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalSource {
    Earnings,
    Referral,
}

impl WithdrawalSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalSource::Earnings => "earnings",
            WithdrawalSource::Referral => "referral",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "earnings" => Ok(WithdrawalSource::Earnings),
            "referral" => Ok(WithdrawalSource::Referral),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown withdrawal source '{}'",
                other
            )))),
        }
    }
}

/// Lifecycle of a withdrawal request.
///
/// Funds stay locked from `requested` until a terminal disposition:
/// `paid` consumes them, `rejected`/`failed` release them. The only
/// backward move is the audited `failed -> under_admin_review` reprocess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Requested,
    UnderAdminReview,
    Approved,
    Paid,
    Rejected,
    Failed,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Requested => "requested",
            WithdrawalStatus::UnderAdminReview => "under_admin_review",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Paid => "paid",
            WithdrawalStatus::Rejected => "rejected",
            WithdrawalStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "requested" => Ok(WithdrawalStatus::Requested),
            "under_admin_review" => Ok(WithdrawalStatus::UnderAdminReview),
            "approved" => Ok(WithdrawalStatus::Approved),
            "paid" => Ok(WithdrawalStatus::Paid),
            "rejected" => Ok(WithdrawalStatus::Rejected),
            "failed" => Ok(WithdrawalStatus::Failed),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown withdrawal status '{}'",
                other
            )))),
        }
    }

    /// Paid and rejected requests never move again; failed ones may be
    /// reprocessed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WithdrawalStatus::Paid | WithdrawalStatus::Rejected)
    }

    /// Computes the next status for an event, rejecting anything the
    /// machine does not permit.
    pub fn transition(&self, event: &WithdrawalEvent) -> Result<WithdrawalStatus> {
        use WithdrawalEvent::*;
        use WithdrawalStatus::*;

        let next = match (self, event) {
            (Requested, SubmitForReview) => UnderAdminReview,
            (UnderAdminReview, Approve) => Approved,
            (Approved, ConfirmPaid { .. }) => Paid,
            (Requested | UnderAdminReview | Approved, Reject { .. }) => Rejected,
            (Requested | UnderAdminReview | Approved, Fail { .. }) => Failed,
            (Failed, Reprocess) => UnderAdminReview,
            _ => {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Withdrawal cannot apply {} while {}",
                    event.name(),
                    self.as_str()
                ))))
            }
        };
        Ok(next)
    }
}

/// Events accepted by the withdrawal state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum WithdrawalEvent {
    SubmitForReview,
    Approve,
    /// Delivered by the payment rail; idempotent on `rrn`.
    ConfirmPaid { rrn: String, gateway: String },
    Reject { reason: String },
    Fail { reason: Option<String> },
    Reprocess,
}

impl WithdrawalEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WithdrawalEvent::SubmitForReview => "submit_for_review",
            WithdrawalEvent::Approve => "approve",
            WithdrawalEvent::ConfirmPaid { .. } => "confirm_paid",
            WithdrawalEvent::Reject { .. } => "reject",
            WithdrawalEvent::Fail { .. } => "fail",
            WithdrawalEvent::Reprocess => "reprocess",
        }
    }
}

/// Domain model for a withdrawal request.
///
/// `net_amount = amount - charges - tds`, fixed at creation; the full
/// `amount` stays locked in the wallet until disposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub source: WithdrawalSource,
    pub charges: Decimal,
    pub tds: Decimal,
    pub net_amount: Decimal,
    pub status: WithdrawalStatus,
    pub reason: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    /// Gateway reference number of the payment attempt.
    pub rrn: Option<String>,
    pub gateway: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for a user's withdrawal request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWithdrawalRequest {
    pub user_id: String,
    pub amount: Decimal,
    pub source: WithdrawalSource,
}

/// Field changes a transition writes alongside the status flip.
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalStateUpdate {
    pub status: WithdrawalStatus,
    pub reason: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub rrn: Option<String>,
    pub gateway: Option<String>,
}

impl WithdrawalStateUpdate {
    pub fn status_only(status: WithdrawalStatus) -> Self {
        WithdrawalStateUpdate {
            status,
            reason: None,
            paid_at: None,
            rrn: None,
            gateway: None,
        }
    }
}
