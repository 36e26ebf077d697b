//! Withdrawal repository and service traits.

use async_trait::async_trait;

use super::withdrawals_model::{
    NewWithdrawalRequest, Withdrawal, WithdrawalEvent, WithdrawalStateUpdate, WithdrawalStatus,
};
use crate::errors::Result;
use crate::wallets::WalletEffect;

/// Trait defining the contract for withdrawal persistence.
///
/// Both writes couple the wallet and the withdrawal row inside one
/// transaction on the serialized writer; a failed lock means the request
/// is never stored.
#[async_trait]
pub trait WithdrawalRepositoryTrait: Send + Sync {
    /// Retrieves a withdrawal by its ID.
    fn get_withdrawal(&self, withdrawal_id: &str) -> Result<Withdrawal>;

    /// All withdrawals of one user, newest first.
    fn list_for_user(&self, user_id: &str) -> Result<Vec<Withdrawal>>;

    /// Persists the request and locks `withdrawal.amount` atomically.
    async fn create_with_lock(&self, withdrawal: Withdrawal) -> Result<Withdrawal>;

    /// Applies a state update and the optional wallet effect atomically.
    ///
    /// Fails with `ConflictError::ConcurrentMutation` when the stored
    /// status no longer equals `expected`.
    async fn transition(
        &self,
        withdrawal_id: &str,
        expected: WithdrawalStatus,
        update: WithdrawalStateUpdate,
        effect: Option<WalletEffect>,
    ) -> Result<Withdrawal>;
}

/// Trait defining the contract for withdrawal operations.
#[async_trait]
pub trait WithdrawalServiceTrait: Send + Sync {
    fn get_withdrawal(&self, withdrawal_id: &str) -> Result<Withdrawal>;

    fn list_for_user(&self, user_id: &str) -> Result<Vec<Withdrawal>>;

    /// Computes charges and TDS from the platform terms, then persists the
    /// request with its funds locked.
    async fn request_withdrawal(&self, request: NewWithdrawalRequest) -> Result<Withdrawal>;

    /// Applies a single lifecycle event to one withdrawal.
    async fn transition(&self, withdrawal_id: &str, event: WithdrawalEvent) -> Result<Withdrawal>;

    /// Re-enters admin review from `failed`, re-locking the amount.
    /// A second invocation is a no-op.
    async fn reprocess(&self, withdrawal_id: &str) -> Result<Withdrawal>;
}
