use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::wallets_model::{LedgerEntry, Wallet, WalletOp};
use super::wallets_traits::{WalletRepositoryTrait, WalletServiceTrait};
use crate::errors::{Error, Result, ValidationError};

/// Service for wallet fund movements.
pub struct WalletService {
    repository: Arc<dyn WalletRepositoryTrait>,
}

impl WalletService {
    pub fn new(repository: Arc<dyn WalletRepositoryTrait>) -> Self {
        WalletService { repository }
    }

    fn check_amount(amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Amount must be positive, got {}",
                amount
            ))));
        }
        Ok(())
    }

    async fn apply(
        &self,
        user_id: &str,
        op: WalletOp,
        reference_id: Option<String>,
    ) -> Result<Wallet> {
        Self::check_amount(op.amount())?;
        debug!(
            "Applying {:?} for user {} (ref {:?})",
            op, user_id, reference_id
        );
        self.repository
            .apply_operation(user_id, op, reference_id)
            .await
    }
}

#[async_trait::async_trait]
impl WalletServiceTrait for WalletService {
    fn get_wallet(&self, user_id: &str) -> Result<Wallet> {
        self.repository.get_wallet(user_id)
    }

    fn get_ledger_entries(&self, user_id: &str) -> Result<Vec<LedgerEntry>> {
        self.repository.get_ledger_entries(user_id)
    }

    async fn credit(
        &self,
        user_id: &str,
        amount: Decimal,
        reference_id: Option<String>,
    ) -> Result<Wallet> {
        self.apply(user_id, WalletOp::Credit(amount), reference_id)
            .await
    }

    async fn debit(
        &self,
        user_id: &str,
        amount: Decimal,
        reference_id: Option<String>,
    ) -> Result<Wallet> {
        self.apply(user_id, WalletOp::Debit(amount), reference_id)
            .await
    }

    async fn lock(
        &self,
        user_id: &str,
        amount: Decimal,
        reference_id: Option<String>,
    ) -> Result<Wallet> {
        self.apply(user_id, WalletOp::Lock(amount), reference_id)
            .await
    }

    async fn unlock(
        &self,
        user_id: &str,
        amount: Decimal,
        reference_id: Option<String>,
    ) -> Result<Wallet> {
        self.apply(user_id, WalletOp::Unlock(amount), reference_id)
            .await
    }

    async fn consume_locked(
        &self,
        user_id: &str,
        amount: Decimal,
        reference_id: Option<String>,
    ) -> Result<Wallet> {
        self.apply(user_id, WalletOp::ConsumeLocked(amount), reference_id)
            .await
    }
}
