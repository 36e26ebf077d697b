//! Wallet repository and service traits.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::wallets_model::{LedgerEntry, Wallet, WalletOp};
use crate::errors::Result;

/// Trait defining the contract for wallet persistence.
///
/// `apply_operation` must run the invariant check, the row update, and the
/// ledger append inside one transaction on the serialized writer, so
/// concurrent operations on the same user cannot both pass the check.
#[async_trait]
pub trait WalletRepositoryTrait: Send + Sync {
    /// Current figures for a user; a zero wallet when none is stored yet.
    fn get_wallet(&self, user_id: &str) -> Result<Wallet>;

    /// Full audit trail for a user, oldest first.
    fn get_ledger_entries(&self, user_id: &str) -> Result<Vec<LedgerEntry>>;

    /// Validates and applies one operation atomically, appending the
    /// matching ledger entry. Returns the resulting wallet.
    async fn apply_operation(
        &self,
        user_id: &str,
        op: WalletOp,
        reference_id: Option<String>,
    ) -> Result<Wallet>;
}

/// Trait defining the contract for wallet operations.
#[async_trait]
pub trait WalletServiceTrait: Send + Sync {
    fn get_wallet(&self, user_id: &str) -> Result<Wallet>;

    fn get_ledger_entries(&self, user_id: &str) -> Result<Vec<LedgerEntry>>;

    async fn credit(
        &self,
        user_id: &str,
        amount: Decimal,
        reference_id: Option<String>,
    ) -> Result<Wallet>;

    async fn debit(
        &self,
        user_id: &str,
        amount: Decimal,
        reference_id: Option<String>,
    ) -> Result<Wallet>;

    async fn lock(
        &self,
        user_id: &str,
        amount: Decimal,
        reference_id: Option<String>,
    ) -> Result<Wallet>;

    async fn unlock(
        &self,
        user_id: &str,
        amount: Decimal,
        reference_id: Option<String>,
    ) -> Result<Wallet>;

    async fn consume_locked(
        &self,
        user_id: &str,
        amount: Decimal,
        reference_id: Option<String>,
    ) -> Result<Wallet>;
}
