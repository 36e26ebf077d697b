use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use payvest_core::constants::PLATFORM_ACCOUNT_ID;
use payvest_core::wallets::{LedgerEntryKind, WalletEffect, WalletOp};
use payvest_core::withdrawals::{
    Withdrawal, WithdrawalRepositoryTrait, WithdrawalStateUpdate, WithdrawalStatus,
};
use payvest_core::errors::ConflictError;
use payvest_core::{Error, Result};

use super::model::WithdrawalDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::withdrawals;
use crate::utils::{format_timestamp, format_timestamp_opt};
use crate::wallets::repository::{append_ledger_entry_tx, apply_wallet_op_tx};

pub struct WithdrawalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl WithdrawalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        WithdrawalRepository { pool, writer }
    }
}

fn load_withdrawal_tx(conn: &mut SqliteConnection, withdrawal_id: &str) -> Result<WithdrawalDB> {
    withdrawals::table
        .find(withdrawal_id)
        .first::<WithdrawalDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::NotFound(format!("Withdrawal {}", withdrawal_id)))
}

#[async_trait]
impl WithdrawalRepositoryTrait for WithdrawalRepository {
    fn get_withdrawal(&self, withdrawal_id: &str) -> Result<Withdrawal> {
        let mut conn = get_connection(&self.pool)?;
        let row: Option<WithdrawalDB> = withdrawals::table
            .find(withdrawal_id)
            .first::<WithdrawalDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        row.map(Withdrawal::from)
            .ok_or_else(|| Error::NotFound(format!("Withdrawal {}", withdrawal_id)))
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<Withdrawal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = withdrawals::table
            .filter(withdrawals::user_id.eq(user_id))
            .order(withdrawals::created_at.desc())
            .load::<WithdrawalDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Withdrawal::from).collect())
    }

    async fn create_with_lock(&self, withdrawal: Withdrawal) -> Result<Withdrawal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Withdrawal> {
                // Lock first: an insufficient-funds rejection rolls back
                // before the request row ever exists.
                apply_wallet_op_tx(
                    conn,
                    &withdrawal.user_id,
                    &WalletOp::Lock(withdrawal.amount),
                    Some(&withdrawal.id),
                )?;

                let row = WithdrawalDB::from(withdrawal);
                diesel::insert_into(withdrawals::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(Withdrawal::from(row))
            })
            .await
    }

    async fn transition(
        &self,
        withdrawal_id: &str,
        expected: WithdrawalStatus,
        update: WithdrawalStateUpdate,
        effect: Option<WalletEffect>,
    ) -> Result<Withdrawal> {
        let withdrawal_id = withdrawal_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Withdrawal> {
                let mut row = load_withdrawal_tx(conn, &withdrawal_id)?;

                // Status compare under the transaction: a concurrent
                // transition surfaces as a conflict, never a double apply.
                if row.status != expected.as_str() {
                    return Err(Error::Conflict(ConflictError::ConcurrentMutation(format!(
                        "withdrawal {} is {}, expected {}",
                        withdrawal_id,
                        row.status,
                        expected.as_str()
                    ))));
                }

                if let Some(effect) = effect {
                    apply_wallet_op_tx(conn, &row.user_id, &effect.op, Some(&withdrawal_id))?;
                    if let Some(revenue) = effect.platform_revenue {
                        append_ledger_entry_tx(
                            conn,
                            PLATFORM_ACCOUNT_ID,
                            &revenue,
                            LedgerEntryKind::PlatformRevenue,
                            Some(&withdrawal_id),
                        )?;
                    }
                }

                row.status = update.status.as_str().to_string();
                if update.reason.is_some() {
                    row.reason = update.reason;
                }
                if update.paid_at.is_some() {
                    row.paid_at = format_timestamp_opt(update.paid_at);
                }
                if update.rrn.is_some() {
                    row.rrn = update.rrn;
                }
                if update.gateway.is_some() {
                    row.gateway = update.gateway;
                }
                row.updated_at = format_timestamp(Utc::now());

                diesel::update(withdrawals::table.find(&withdrawal_id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(Withdrawal::from(row))
            })
            .await
    }
}
