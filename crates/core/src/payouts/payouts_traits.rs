//! Payout repository and service traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::payouts_model::{
    AdvanceOutcome, GenerateSchedule, Payout, PayoutEvent, PayoutSimulateResponse,
    PayoutStateUpdate, PayoutStatus,
};
use crate::errors::Result;
use crate::wallets::WalletEffect;

/// Trait defining the contract for payout persistence.
#[async_trait]
pub trait PayoutRepositoryTrait: Send + Sync {
    /// Retrieves a payout by its ID.
    fn get_payout(&self, payout_id: &str) -> Result<Payout>;

    /// All payouts of one investment, by month number ascending.
    fn list_for_investment(&self, investment_id: &str) -> Result<Vec<Payout>>;

    /// `scheduled` payouts whose due date has elapsed as of `as_of`.
    fn list_due(&self, as_of: DateTime<Utc>) -> Result<Vec<Payout>>;

    /// Inserts a freshly generated schedule in one transaction.
    async fn create_many(&self, payouts: Vec<Payout>) -> Result<usize>;

    /// Applies a state update and the optional wallet effect atomically.
    ///
    /// Fails with `ConflictError::ConcurrentMutation` when the stored
    /// status no longer equals `expected`. A credit effect referencing a
    /// payout that already has a credit ledger entry is skipped, keeping
    /// reprocessing idempotent.
    async fn transition(
        &self,
        payout_id: &str,
        expected: PayoutStatus,
        update: PayoutStateUpdate,
        effect: Option<WalletEffect>,
    ) -> Result<Payout>;
}

/// Trait defining the contract for payout operations.
#[async_trait]
pub trait PayoutServiceTrait: Send + Sync {
    fn get_payout(&self, payout_id: &str) -> Result<Payout>;

    fn list_for_investment(&self, investment_id: &str) -> Result<Vec<Payout>>;

    /// Previews a monthly payout against the active rule; no persistence.
    fn simulate(
        &self,
        amount: Decimal,
        month_index: u32,
        booster_applied: bool,
    ) -> Result<PayoutSimulateResponse>;

    /// Creates the month-by-month schedule for an accepted investment.
    async fn generate_schedule(&self, request: GenerateSchedule) -> Result<Vec<Payout>>;

    /// Moves every due `scheduled` payout through compute-credit-paid.
    async fn advance_due_schedules(&self, as_of: DateTime<Utc>) -> Result<AdvanceOutcome>;

    /// Applies a single lifecycle event to one payout.
    async fn transition(&self, payout_id: &str, event: PayoutEvent) -> Result<Payout>;
}
