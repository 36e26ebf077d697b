use chrono::{DateTime, Months, Utc};
use log::{debug, error, warn};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use super::calculator::compute_payout;
use super::payouts_model::{
    AdvanceOutcome, GenerateSchedule, Payout, PayoutEvent, PayoutFailure, PayoutSimulateResponse,
    PayoutStateUpdate, PayoutStatus,
};
use super::payouts_traits::{PayoutRepositoryTrait, PayoutServiceTrait};
use crate::constants::DEFAULT_CURRENCY;
use crate::errors::{Error, Result, ValidationError};
use crate::rules::{PlanRule, RuleServiceTrait};
use crate::wallets::{WalletEffect, WalletOp};

/// Service driving payout schedules through their lifecycle.
pub struct PayoutService {
    repository: Arc<dyn PayoutRepositoryTrait>,
    rule_service: Arc<dyn RuleServiceTrait>,
}

impl PayoutService {
    pub fn new(
        repository: Arc<dyn PayoutRepositoryTrait>,
        rule_service: Arc<dyn RuleServiceTrait>,
    ) -> Self {
        PayoutService {
            repository,
            rule_service,
        }
    }

    fn active_rule(&self) -> Result<PlanRule> {
        self.rule_service
            .get_active()?
            .ok_or_else(|| Error::NotFound("Active plan rule".to_string()))
    }

    /// Compute-credit-confirm for one due payout. The credit is applied in
    /// the same transaction as the `processing` flip; confirmation is a
    /// second, idempotence-guarded step.
    async fn process_one(&self, payout: &Payout, rule: &PlanRule) -> Result<String> {
        let breakdown = compute_payout(
            payout.principal,
            payout.month_no,
            rule,
            payout.booster_applied,
        )?;

        let update = PayoutStateUpdate {
            status: PayoutStatus::Processing,
            amount: Some(breakdown.net_payout),
            reason: None,
            paid_at: None,
        };
        self.repository
            .transition(
                &payout.id,
                PayoutStatus::Scheduled,
                update,
                Some(WalletEffect::new(WalletOp::Credit(breakdown.net_payout))),
            )
            .await?;

        let confirm = PayoutStateUpdate {
            status: PayoutStatus::Paid,
            amount: None,
            reason: None,
            paid_at: Some(Utc::now()),
        };
        self.repository
            .transition(&payout.id, PayoutStatus::Processing, confirm, None)
            .await?;

        Ok(payout.id.clone())
    }

    /// Best-effort `failed` marker; the payout may still be `scheduled`
    /// (computation failed) or already `processing` (confirmation failed).
    async fn mark_failed(&self, payout_id: &str, reason: &str) {
        let update = |reason: &str| PayoutStateUpdate {
            status: PayoutStatus::Failed,
            amount: None,
            reason: Some(reason.to_string()),
            paid_at: None,
        };
        for expected in [PayoutStatus::Scheduled, PayoutStatus::Processing] {
            match self
                .repository
                .transition(payout_id, expected, update(reason), None)
                .await
            {
                Ok(_) => return,
                Err(Error::Conflict(_)) => continue,
                Err(e) => {
                    error!("Could not mark payout {} as failed: {}", payout_id, e);
                    return;
                }
            }
        }
        error!(
            "Could not mark payout {} as failed: unexpected status",
            payout_id
        );
    }
}

#[async_trait::async_trait]
impl PayoutServiceTrait for PayoutService {
    fn get_payout(&self, payout_id: &str) -> Result<Payout> {
        self.repository.get_payout(payout_id)
    }

    fn list_for_investment(&self, investment_id: &str) -> Result<Vec<Payout>> {
        self.repository.list_for_investment(investment_id)
    }

    fn simulate(
        &self,
        amount: Decimal,
        month_index: u32,
        booster_applied: bool,
    ) -> Result<PayoutSimulateResponse> {
        let rule = self.active_rule()?;
        let breakdown = compute_payout(amount, month_index, &rule, booster_applied)?;
        Ok(PayoutSimulateResponse {
            rule_id: rule.id,
            rule_version: rule.version,
            month_index,
            gross_monthly: breakdown.gross_monthly,
            admin_charge_amount: breakdown.admin_charge_amount,
            booster_amount: breakdown.booster_amount,
            net_payout: breakdown.net_payout,
            monthly_rate: breakdown.monthly_rate,
            currency: DEFAULT_CURRENCY.to_string(),
        })
    }

    async fn generate_schedule(&self, request: GenerateSchedule) -> Result<Vec<Payout>> {
        if request.duration_months == 0 {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Schedule must cover at least one month".to_string(),
            )));
        }
        if request.principal <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Principal must be positive".to_string(),
            )));
        }

        let rule = self.active_rule()?;
        if request.principal < rule.min_amount {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Principal {} is below the plan minimum {}",
                request.principal, rule.min_amount
            ))));
        }

        let now = Utc::now();
        let mut payouts = Vec::with_capacity(request.duration_months as usize);
        for month_no in 1..=request.duration_months {
            let due_date = request
                .accepted_at
                .checked_add_months(Months::new(month_no))
                .ok_or_else(|| {
                    Error::Validation(ValidationError::InvalidInput(format!(
                        "Due date overflows for month {}",
                        month_no
                    )))
                })?;
            payouts.push(Payout {
                id: Uuid::new_v4().to_string(),
                investment_id: request.investment_id.clone(),
                user_id: request.user_id.clone(),
                month_no,
                due_date,
                principal: request.principal,
                booster_applied: request.booster_applied,
                amount: None,
                status: PayoutStatus::Scheduled,
                reason: None,
                paid_at: None,
                created_at: now,
                updated_at: now,
            });
        }

        debug!(
            "Generating {} payouts for investment {}",
            payouts.len(),
            request.investment_id
        );
        self.repository.create_many(payouts.clone()).await?;
        Ok(payouts)
    }

    async fn advance_due_schedules(&self, as_of: DateTime<Utc>) -> Result<AdvanceOutcome> {
        let due = self.repository.list_due(as_of)?;
        let mut outcome = AdvanceOutcome::default();
        if due.is_empty() {
            return Ok(outcome);
        }

        // One rule snapshot per batch keeps a mid-batch activation from
        // splitting the run across two rule versions.
        let rule = self.active_rule()?;

        for payout in due {
            match self.process_one(&payout, &rule).await {
                Ok(id) => outcome.paid.push(id),
                Err(e) => {
                    warn!("Payout {} failed to advance: {}", payout.id, e);
                    let reason = e.to_string();
                    self.mark_failed(&payout.id, &reason).await;
                    outcome.failed.push(PayoutFailure {
                        payout_id: payout.id,
                        reason,
                    });
                }
            }
        }
        Ok(outcome)
    }

    async fn transition(&self, payout_id: &str, event: PayoutEvent) -> Result<Payout> {
        let payout = self.repository.get_payout(payout_id)?;
        let next = payout.status.transition(&event)?;

        // Entering `processing` computes the amount against the rule
        // active right now and applies the credit in the same transaction.
        // A resume with no amount yet does the same; the repository skips
        // the credit when a ledger entry for this payout already exists.
        let needs_credit = matches!(event, PayoutEvent::BeginProcessing)
            || (matches!(event, PayoutEvent::Resume) && payout.amount.is_none());

        let (update, effect) = if needs_credit {
            let rule = self.active_rule()?;
            let breakdown = compute_payout(
                payout.principal,
                payout.month_no,
                &rule,
                payout.booster_applied,
            )?;
            (
                PayoutStateUpdate {
                    status: next,
                    amount: Some(breakdown.net_payout),
                    reason: None,
                    paid_at: None,
                },
                Some(WalletEffect::new(WalletOp::Credit(breakdown.net_payout))),
            )
        } else {
            match event {
                PayoutEvent::ConfirmPaid => (
                    PayoutStateUpdate {
                        status: next,
                        amount: None,
                        reason: None,
                        paid_at: Some(Utc::now()),
                    },
                    None,
                ),
                PayoutEvent::Fail { reason } => (
                    PayoutStateUpdate {
                        status: next,
                        amount: None,
                        reason: Some(reason),
                        paid_at: None,
                    },
                    None,
                ),
                _ => (PayoutStateUpdate::status_only(next), None),
            }
        };

        self.repository
            .transition(payout_id, payout.status, update, effect)
            .await
    }
}
