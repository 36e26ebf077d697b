//! Wallet domain models.
//!
//! A wallet holds two figures: `balance` (everything the user owns on the
//! platform) and `locked` (the part earmarked for pending withdrawals).
//! `available` is always derived, never stored. Every mutation appends an
//! immutable ledger entry so the figures can be rebuilt by replay.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Domain model for a user's wallet figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub user_id: String,
    pub balance: Decimal,
    pub locked: Decimal,
}

impl Wallet {
    /// Empty wallet for a user without prior activity.
    pub fn new(user_id: impl Into<String>) -> Self {
        Wallet {
            user_id: user_id.into(),
            balance: Decimal::ZERO,
            locked: Decimal::ZERO,
        }
    }

    /// Funds not earmarked for a pending withdrawal.
    pub fn available(&self) -> Decimal {
        self.balance - self.locked
    }

    /// Applies one operation, enforcing `0 <= locked <= balance`.
    ///
    /// Returns the resulting wallet; the input is untouched so callers can
    /// keep the pre-image for rollback and audit.
    pub fn apply(&self, op: &WalletOp) -> Result<Wallet> {
        let amount = op.amount();
        if amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Wallet operation amount must be positive, got {}",
                amount
            ))));
        }

        let mut next = self.clone();
        match op {
            WalletOp::Credit(a) => {
                next.balance += *a;
            }
            WalletOp::Debit(a) => {
                if self.available() < *a {
                    return Err(Error::InsufficientFunds {
                        requested: *a,
                        available: self.available(),
                    });
                }
                next.balance -= *a;
            }
            WalletOp::Lock(a) => {
                if self.available() < *a {
                    return Err(Error::InsufficientFunds {
                        requested: *a,
                        available: self.available(),
                    });
                }
                next.locked += *a;
            }
            WalletOp::Unlock(a) => {
                if self.locked < *a {
                    return Err(Error::InsufficientLocked {
                        requested: *a,
                        locked: self.locked,
                    });
                }
                next.locked -= *a;
            }
            WalletOp::ConsumeLocked(a) => {
                if self.locked < *a {
                    return Err(Error::InsufficientLocked {
                        requested: *a,
                        locked: self.locked,
                    });
                }
                next.balance -= *a;
                next.locked -= *a;
            }
        }
        Ok(next)
    }

    /// Rebuilds wallet figures by replaying ledger entries, for
    /// reconciliation against the materialized row.
    pub fn from_entries<'a>(
        user_id: impl Into<String>,
        entries: impl IntoIterator<Item = &'a LedgerEntry>,
    ) -> Wallet {
        let mut wallet = Wallet::new(user_id);
        for entry in entries {
            match entry.kind {
                LedgerEntryKind::Credit | LedgerEntryKind::PlatformRevenue => {
                    wallet.balance += entry.amount;
                }
                LedgerEntryKind::Debit => {
                    wallet.balance -= entry.amount;
                }
                LedgerEntryKind::Lock => {
                    wallet.locked += entry.amount;
                }
                LedgerEntryKind::Unlock => {
                    wallet.locked -= entry.amount;
                }
                LedgerEntryKind::ConsumeLocked => {
                    wallet.balance -= entry.amount;
                    wallet.locked -= entry.amount;
                }
            }
        }
        wallet
    }
}

/// One atomic wallet mutation. Amounts are always positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WalletOp {
    Credit(Decimal),
    Debit(Decimal),
    Lock(Decimal),
    Unlock(Decimal),
    ConsumeLocked(Decimal),
}

impl WalletOp {
    pub fn amount(&self) -> Decimal {
        match self {
            WalletOp::Credit(a)
            | WalletOp::Debit(a)
            | WalletOp::Lock(a)
            | WalletOp::Unlock(a)
            | WalletOp::ConsumeLocked(a) => *a,
        }
    }

    /// Ledger entry kind recorded for this operation.
    pub fn kind(&self) -> LedgerEntryKind {
        match self {
            WalletOp::Credit(_) => LedgerEntryKind::Credit,
            WalletOp::Debit(_) => LedgerEntryKind::Debit,
            WalletOp::Lock(_) => LedgerEntryKind::Lock,
            WalletOp::Unlock(_) => LedgerEntryKind::Unlock,
            WalletOp::ConsumeLocked(_) => LedgerEntryKind::ConsumeLocked,
        }
    }
}

/// Wallet side effect attached to a state-machine transition.
///
/// `platform_revenue`, when set, books an additional entry of that amount
/// against the reserved platform account in the same transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletEffect {
    pub op: WalletOp,
    pub platform_revenue: Option<Decimal>,
}

impl WalletEffect {
    pub fn new(op: WalletOp) -> Self {
        WalletEffect {
            op,
            platform_revenue: None,
        }
    }

    pub fn with_platform_revenue(op: WalletOp, revenue: Decimal) -> Self {
        WalletEffect {
            op,
            platform_revenue: Some(revenue),
        }
    }
}

/// Classification of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    Credit,
    Debit,
    Lock,
    Unlock,
    ConsumeLocked,
    PlatformRevenue,
}

impl LedgerEntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryKind::Credit => "credit",
            LedgerEntryKind::Debit => "debit",
            LedgerEntryKind::Lock => "lock",
            LedgerEntryKind::Unlock => "unlock",
            LedgerEntryKind::ConsumeLocked => "consume_locked",
            LedgerEntryKind::PlatformRevenue => "platform_revenue",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "credit" => Ok(LedgerEntryKind::Credit),
            "debit" => Ok(LedgerEntryKind::Debit),
            "lock" => Ok(LedgerEntryKind::Lock),
            "unlock" => Ok(LedgerEntryKind::Unlock),
            "consume_locked" => Ok(LedgerEntryKind::ConsumeLocked),
            "platform_revenue" => Ok(LedgerEntryKind::PlatformRevenue),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown ledger entry kind '{}'",
                other
            )))),
        }
    }
}

/// Immutable audit record appended by every wallet mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub kind: LedgerEntryKind,
    /// Withdrawal or payout this entry was booked for, when applicable.
    pub reference_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
