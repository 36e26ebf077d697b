use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use payvest_core::wallets::{LedgerEntry, Wallet, WalletOp, WalletRepositoryTrait};
use payvest_core::Result;

use super::model::{new_ledger_entry_row, LedgerEntryDB, WalletDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{ledger_entries, wallets};
use crate::utils::format_timestamp;

pub struct WalletRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl WalletRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        WalletRepository { pool, writer }
    }
}

/// Loads, mutates, and stores one wallet row, appending the ledger entry,
/// all on the caller's (transactional) connection. The invariant check in
/// `Wallet::apply` aborts the transaction on violation.
///
/// Shared with the withdrawal and payout repositories so their state flips
/// and fund movements commit together.
pub(crate) fn apply_wallet_op_tx(
    conn: &mut SqliteConnection,
    user_id: &str,
    op: &WalletOp,
    reference_id: Option<&str>,
) -> Result<Wallet> {
    let now = Utc::now();
    let now_str = format_timestamp(now);

    let existing: Option<WalletDB> = wallets::table
        .find(user_id)
        .first::<WalletDB>(conn)
        .optional()
        .map_err(StorageError::from)?;

    let exists = existing.is_some();
    let current = existing
        .map(Wallet::from)
        .unwrap_or_else(|| Wallet::new(user_id));
    let next = current.apply(op)?;

    if exists {
        diesel::update(wallets::table.find(user_id))
            .set((
                wallets::balance.eq(next.balance.to_string()),
                wallets::locked.eq(next.locked.to_string()),
                wallets::updated_at.eq(&now_str),
            ))
            .execute(conn)
            .map_err(StorageError::from)?;
    } else {
        let new_row = WalletDB::from_domain(&next, &now_str, &now_str);
        diesel::insert_into(wallets::table)
            .values(&new_row)
            .execute(conn)
            .map_err(StorageError::from)?;
    }

    let entry = new_ledger_entry_row(user_id, &op.amount(), op.kind(), reference_id, now);
    diesel::insert_into(ledger_entries::table)
        .values(&entry)
        .execute(conn)
        .map_err(StorageError::from)?;

    Ok(next)
}

/// Appends a bare ledger entry (platform-revenue bookings) on the caller's
/// connection.
pub(crate) fn append_ledger_entry_tx(
    conn: &mut SqliteConnection,
    user_id: &str,
    amount: &rust_decimal::Decimal,
    kind: payvest_core::wallets::LedgerEntryKind,
    reference_id: Option<&str>,
) -> Result<()> {
    let entry = new_ledger_entry_row(user_id, amount, kind, reference_id, Utc::now());
    diesel::insert_into(ledger_entries::table)
        .values(&entry)
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(())
}

/// True when a credit for this reference was already booked; used to keep
/// payout reprocessing idempotent.
pub(crate) fn has_credit_entry_tx(conn: &mut SqliteConnection, reference: &str) -> Result<bool> {
    let count: i64 = ledger_entries::table
        .filter(ledger_entries::reference_id.eq(reference))
        .filter(ledger_entries::kind.eq("credit"))
        .count()
        .get_result(conn)
        .map_err(StorageError::from)?;
    Ok(count > 0)
}

#[async_trait]
impl WalletRepositoryTrait for WalletRepository {
    fn get_wallet(&self, user_id: &str) -> Result<Wallet> {
        let mut conn = get_connection(&self.pool)?;
        let row: Option<WalletDB> = wallets::table
            .find(user_id)
            .first::<WalletDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row
            .map(Wallet::from)
            .unwrap_or_else(|| Wallet::new(user_id)))
    }

    fn get_ledger_entries(&self, user_id: &str) -> Result<Vec<LedgerEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = ledger_entries::table
            .filter(ledger_entries::user_id.eq(user_id))
            .order((ledger_entries::created_at.asc(), ledger_entries::id.asc()))
            .load::<LedgerEntryDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(LedgerEntry::from).collect())
    }

    async fn apply_operation(
        &self,
        user_id: &str,
        op: WalletOp,
        reference_id: Option<String>,
    ) -> Result<Wallet> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Wallet> {
                apply_wallet_op_tx(conn, &user_id, &op, reference_id.as_deref())
            })
            .await
    }
}
