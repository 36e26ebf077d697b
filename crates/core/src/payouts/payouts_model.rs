//! Payout schedule domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Lifecycle of one scheduled monthly payout.
///
/// `scheduled -> processing -> paid` is the happy path; `failed` and
/// `reprocessing` form the retry loop, `on_hold` and `pending` are
/// administrative pauses for a single investor's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Scheduled,
    Processing,
    Paid,
    Failed,
    Reprocessing,
    OnHold,
    Pending,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Scheduled => "scheduled",
            PayoutStatus::Processing => "processing",
            PayoutStatus::Paid => "paid",
            PayoutStatus::Failed => "failed",
            PayoutStatus::Reprocessing => "reprocessing",
            PayoutStatus::OnHold => "on_hold",
            PayoutStatus::Pending => "pending",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "scheduled" => Ok(PayoutStatus::Scheduled),
            "processing" => Ok(PayoutStatus::Processing),
            "paid" => Ok(PayoutStatus::Paid),
            "failed" => Ok(PayoutStatus::Failed),
            "reprocessing" => Ok(PayoutStatus::Reprocessing),
            "on_hold" => Ok(PayoutStatus::OnHold),
            "pending" => Ok(PayoutStatus::Pending),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown payout status '{}'",
                other
            )))),
        }
    }

    /// Paid payouts never move again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PayoutStatus::Paid)
    }

    /// Computes the next status for an event, rejecting anything the
    /// machine does not permit. Instances only move forward; the
    /// `failed -> reprocessing -> processing` loop is the one audited
    /// exception.
    pub fn transition(&self, event: &PayoutEvent) -> Result<PayoutStatus> {
        use PayoutEvent::*;
        use PayoutStatus::*;

        let next = match (self, event) {
            (Scheduled, BeginProcessing) => Processing,
            (Reprocessing, BeginProcessing) => Processing,
            (Processing, ConfirmPaid) => Paid,
            // A failure while still scheduled covers computation errors
            // surfaced before any credit was applied.
            (Scheduled, Fail { .. }) => Failed,
            (Processing, Fail { .. }) => Failed,
            (Failed, Reprocess) => Reprocessing,
            (Scheduled, Hold) => OnHold,
            (Processing, Hold) => OnHold,
            (Scheduled, MarkPending) => Pending,
            (Processing, MarkPending) => Pending,
            (OnHold, Resume) => Processing,
            (Pending, Resume) => Processing,
            _ => {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Payout cannot apply {} while {}",
                    event.name(),
                    self.as_str()
                ))))
            }
        };
        Ok(next)
    }
}

/// Events accepted by the payout state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum PayoutEvent {
    BeginProcessing,
    ConfirmPaid,
    Fail { reason: String },
    Reprocess,
    Hold,
    MarkPending,
    Resume,
}

impl PayoutEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PayoutEvent::BeginProcessing => "begin_processing",
            PayoutEvent::ConfirmPaid => "confirm_paid",
            PayoutEvent::Fail { .. } => "fail",
            PayoutEvent::Reprocess => "reprocess",
            PayoutEvent::Hold => "hold",
            PayoutEvent::MarkPending => "mark_pending",
            PayoutEvent::Resume => "resume",
        }
    }
}

/// One scheduled monthly payout for an accepted investment.
///
/// `amount` stays empty until processing: the figure is computed against
/// the rule active at the due date, not frozen at schedule creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub id: String,
    pub investment_id: String,
    pub user_id: String,
    /// 1-based month offset from investment acceptance.
    pub month_no: u32,
    pub due_date: DateTime<Utc>,
    /// Principal of the investment, denormalized at schedule creation.
    pub principal: Decimal,
    pub booster_applied: bool,
    pub amount: Option<Decimal>,
    pub status: PayoutStatus,
    pub reason: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field changes a transition writes alongside the status flip.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoutStateUpdate {
    pub status: PayoutStatus,
    pub amount: Option<Decimal>,
    pub reason: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl PayoutStateUpdate {
    pub fn status_only(status: PayoutStatus) -> Self {
        PayoutStateUpdate {
            status,
            amount: None,
            reason: None,
            paid_at: None,
        }
    }
}

/// Request to create the full schedule for an accepted investment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSchedule {
    pub investment_id: String,
    pub user_id: String,
    pub principal: Decimal,
    pub accepted_at: DateTime<Utc>,
    pub duration_months: u32,
    pub booster_applied: bool,
}

/// Outcome of one `advance_due_schedules` batch run.
///
/// Failures are carried per payout rather than aborting the batch; the
/// caller decides whether to alert or retry.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceOutcome {
    pub paid: Vec<String>,
    pub failed: Vec<PayoutFailure>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutFailure {
    pub payout_id: String,
    pub reason: String,
}

/// Persistence-free preview of a monthly payout under the active rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutSimulateResponse {
    pub rule_id: String,
    pub rule_version: i32,
    pub month_index: u32,
    pub gross_monthly: Decimal,
    pub admin_charge_amount: Decimal,
    pub booster_amount: Decimal,
    pub net_payout: Decimal,
    pub monthly_rate: Decimal,
    pub currency: String,
}
