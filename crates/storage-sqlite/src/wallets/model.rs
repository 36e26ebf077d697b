//! Database models for wallets and ledger entries.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use payvest_core::utils::parse_decimal_string_tolerant;
use payvest_core::wallets::{LedgerEntry, LedgerEntryKind, Wallet};

use crate::utils::{format_timestamp, parse_timestamp};

/// Database model for a wallet row.
#[derive(
    Insertable,
    Queryable,
    Identifiable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::wallets)]
#[diesel(primary_key(user_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct WalletDB {
    pub user_id: String,
    pub balance: String,
    pub locked: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Database model for a ledger entry row.
#[derive(
    Insertable, Queryable, Identifiable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::ledger_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryDB {
    pub id: String,
    pub user_id: String,
    pub amount: String,
    pub kind: String,
    pub reference_id: Option<String>,
    pub created_at: String,
}

// Conversion to domain models
impl From<WalletDB> for Wallet {
    fn from(db: WalletDB) -> Self {
        Wallet {
            user_id: db.user_id,
            balance: parse_decimal_string_tolerant(&db.balance, "wallet.balance"),
            locked: parse_decimal_string_tolerant(&db.locked, "wallet.locked"),
        }
    }
}

impl From<LedgerEntryDB> for LedgerEntry {
    fn from(db: LedgerEntryDB) -> Self {
        let kind = LedgerEntryKind::parse(&db.kind).unwrap_or_else(|_| {
            log::error!("Unknown ledger kind '{}' on entry {}", db.kind, db.id);
            LedgerEntryKind::Credit
        });
        LedgerEntry {
            id: db.id,
            user_id: db.user_id,
            amount: parse_decimal_string_tolerant(&db.amount, "ledger_entry.amount"),
            kind,
            reference_id: db.reference_id,
            created_at: parse_timestamp(&db.created_at, "ledger_entry.created_at"),
        }
    }
}

impl WalletDB {
    /// Row image for a wallet snapshot, timestamps included.
    pub fn from_domain(wallet: &Wallet, created_at: &str, updated_at: &str) -> Self {
        WalletDB {
            user_id: wallet.user_id.clone(),
            balance: wallet.balance.to_string(),
            locked: wallet.locked.to_string(),
            created_at: created_at.to_string(),
            updated_at: updated_at.to_string(),
        }
    }
}

pub fn new_ledger_entry_row(
    user_id: &str,
    amount: &rust_decimal::Decimal,
    kind: LedgerEntryKind,
    reference_id: Option<&str>,
    at: chrono::DateTime<chrono::Utc>,
) -> LedgerEntryDB {
    LedgerEntryDB {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        amount: amount.to_string(),
        kind: kind.as_str().to_string(),
        reference_id: reference_id.map(|r| r.to_string()),
        created_at: format_timestamp(at),
    }
}
