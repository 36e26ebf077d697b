use chrono::Utc;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use super::withdrawals_model::{
    NewWithdrawalRequest, Withdrawal, WithdrawalEvent, WithdrawalStateUpdate, WithdrawalStatus,
};
use super::withdrawals_traits::{WithdrawalRepositoryTrait, WithdrawalServiceTrait};
use crate::errors::{ConflictError, Error, Result, ValidationError};
use crate::settings::SettingsServiceTrait;
use crate::utils::round_to_minor_units;
use crate::wallets::{WalletEffect, WalletOp};

/// Service driving withdrawal requests through their lifecycle.
pub struct WithdrawalService {
    repository: Arc<dyn WithdrawalRepositoryTrait>,
    settings_service: Arc<dyn SettingsServiceTrait>,
}

impl WithdrawalService {
    pub fn new(
        repository: Arc<dyn WithdrawalRepositoryTrait>,
        settings_service: Arc<dyn SettingsServiceTrait>,
    ) -> Self {
        WithdrawalService {
            repository,
            settings_service,
        }
    }
}

#[async_trait::async_trait]
impl WithdrawalServiceTrait for WithdrawalService {
    fn get_withdrawal(&self, withdrawal_id: &str) -> Result<Withdrawal> {
        self.repository.get_withdrawal(withdrawal_id)
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<Withdrawal>> {
        self.repository.list_for_user(user_id)
    }

    async fn request_withdrawal(&self, request: NewWithdrawalRequest) -> Result<Withdrawal> {
        if request.amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Withdrawal amount must be positive".to_string(),
            )));
        }
        let terms = self.settings_service.get_withdrawal_terms()?;
        if request.amount < terms.min_withdrawal {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Withdrawal amount {} is below the minimum {}",
                request.amount, terms.min_withdrawal
            ))));
        }

        let charges = round_to_minor_units(request.amount * terms.charge_rate);
        let tds = round_to_minor_units(request.amount * terms.tds_rate);
        let net_amount = request.amount - charges - tds;
        if net_amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Charges and TDS leave nothing to pay out".to_string(),
            )));
        }

        let now = Utc::now();
        let withdrawal = Withdrawal {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            amount: request.amount,
            source: request.source,
            charges,
            tds,
            net_amount,
            status: WithdrawalStatus::Requested,
            reason: None,
            paid_at: None,
            rrn: None,
            gateway: None,
            created_at: now,
            updated_at: now,
        };

        debug!(
            "Requesting withdrawal of {} for user {} (net {})",
            withdrawal.amount, withdrawal.user_id, withdrawal.net_amount
        );
        // The lock and the insert are one transaction; on insufficient
        // funds the request never existed.
        self.repository.create_with_lock(withdrawal).await
    }

    async fn transition(&self, withdrawal_id: &str, event: WithdrawalEvent) -> Result<Withdrawal> {
        let withdrawal = self.repository.get_withdrawal(withdrawal_id)?;

        // Duplicate rail confirmations are absorbed, mismatched ones are a
        // conflict - the rail may redeliver, it may not repurpose an rrn.
        if let WithdrawalEvent::ConfirmPaid { rrn, .. } = &event {
            if withdrawal.status == WithdrawalStatus::Paid {
                return if withdrawal.rrn.as_deref() == Some(rrn.as_str()) {
                    Ok(withdrawal)
                } else {
                    Err(Error::Conflict(ConflictError::DuplicateReference(
                        rrn.clone(),
                    )))
                };
            }
        }

        if let WithdrawalEvent::Reject { reason } = &event {
            if reason.trim().is_empty() {
                return Err(Error::Validation(ValidationError::MissingField(
                    "reason".to_string(),
                )));
            }
        }

        let next = withdrawal.status.transition(&event)?;
        let (update, effect) = match event {
            WithdrawalEvent::SubmitForReview | WithdrawalEvent::Approve => {
                (WithdrawalStateUpdate::status_only(next), None)
            }
            WithdrawalEvent::ConfirmPaid { rrn, gateway } => (
                WithdrawalStateUpdate {
                    status: next,
                    reason: None,
                    paid_at: Some(Utc::now()),
                    rrn: Some(rrn),
                    gateway: Some(gateway),
                },
                // The full locked amount leaves the wallet; charges + tds
                // stay on the platform as an explicit revenue entry.
                Some(WalletEffect::with_platform_revenue(
                    WalletOp::ConsumeLocked(withdrawal.amount),
                    withdrawal.charges + withdrawal.tds,
                )),
            ),
            WithdrawalEvent::Reject { reason } => (
                WithdrawalStateUpdate {
                    status: next,
                    reason: Some(reason),
                    paid_at: None,
                    rrn: None,
                    gateway: None,
                },
                Some(WalletEffect::new(WalletOp::Unlock(withdrawal.amount))),
            ),
            WithdrawalEvent::Fail { reason } => (
                WithdrawalStateUpdate {
                    status: next,
                    reason,
                    paid_at: None,
                    rrn: None,
                    gateway: None,
                },
                Some(WalletEffect::new(WalletOp::Unlock(withdrawal.amount))),
            ),
            WithdrawalEvent::Reprocess => (
                WithdrawalStateUpdate::status_only(next),
                // Reprocessing re-validates the wallet: the amount must be
                // lockable again right now, in the same transaction.
                Some(WalletEffect::new(WalletOp::Lock(withdrawal.amount))),
            ),
        };

        self.repository
            .transition(withdrawal_id, withdrawal.status, update, effect)
            .await
    }

    async fn reprocess(&self, withdrawal_id: &str) -> Result<Withdrawal> {
        let withdrawal = self.repository.get_withdrawal(withdrawal_id)?;
        // Re-delivery of the reprocess action is a no-op once the request
        // is back under review.
        if withdrawal.status == WithdrawalStatus::UnderAdminReview {
            return Ok(withdrawal);
        }
        self.transition(withdrawal_id, WithdrawalEvent::Reprocess)
            .await
    }
}
