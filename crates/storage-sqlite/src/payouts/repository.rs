use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use payvest_core::errors::ConflictError;
use payvest_core::payouts::{Payout, PayoutRepositoryTrait, PayoutStateUpdate, PayoutStatus};
use payvest_core::wallets::{LedgerEntryKind, WalletEffect};
use payvest_core::{Error, Result};

use super::model::PayoutDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::payouts;
use crate::utils::{format_timestamp, format_timestamp_opt};
use crate::wallets::repository::{apply_wallet_op_tx, has_credit_entry_tx};

pub struct PayoutRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PayoutRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PayoutRepository { pool, writer }
    }
}

fn load_payout_tx(conn: &mut SqliteConnection, payout_id: &str) -> Result<PayoutDB> {
    payouts::table
        .find(payout_id)
        .first::<PayoutDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::NotFound(format!("Payout {}", payout_id)))
}

#[async_trait]
impl PayoutRepositoryTrait for PayoutRepository {
    fn get_payout(&self, payout_id: &str) -> Result<Payout> {
        let mut conn = get_connection(&self.pool)?;
        let row: Option<PayoutDB> = payouts::table
            .find(payout_id)
            .first::<PayoutDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        row.map(Payout::from)
            .ok_or_else(|| Error::NotFound(format!("Payout {}", payout_id)))
    }

    fn list_for_investment(&self, investment_id: &str) -> Result<Vec<Payout>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = payouts::table
            .filter(payouts::investment_id.eq(investment_id))
            .order(payouts::month_no.asc())
            .load::<PayoutDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Payout::from).collect())
    }

    fn list_due(&self, as_of: DateTime<Utc>) -> Result<Vec<Payout>> {
        let mut conn = get_connection(&self.pool)?;
        // Stored timestamps compare lexicographically in chronological
        // order, so this is a plain string range scan on the index.
        let rows = payouts::table
            .filter(payouts::status.eq(PayoutStatus::Scheduled.as_str()))
            .filter(payouts::due_date.le(format_timestamp(as_of)))
            .order(payouts::due_date.asc())
            .load::<PayoutDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Payout::from).collect())
    }

    async fn create_many(&self, new_payouts: Vec<Payout>) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let rows: Vec<PayoutDB> = new_payouts.into_iter().map(PayoutDB::from).collect();
                Ok(diesel::insert_into(payouts::table)
                    .values(&rows)
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    async fn transition(
        &self,
        payout_id: &str,
        expected: PayoutStatus,
        update: PayoutStateUpdate,
        effect: Option<WalletEffect>,
    ) -> Result<Payout> {
        let payout_id = payout_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Payout> {
                let mut row = load_payout_tx(conn, &payout_id)?;

                if row.status != expected.as_str() {
                    return Err(Error::Conflict(ConflictError::ConcurrentMutation(format!(
                        "payout {} is {}, expected {}",
                        payout_id,
                        row.status,
                        expected.as_str()
                    ))));
                }

                if let Some(effect) = effect {
                    // A credit already booked for this payout (an earlier
                    // attempt that failed after the money landed) is not
                    // applied twice.
                    let skip = effect.op.kind() == LedgerEntryKind::Credit
                        && has_credit_entry_tx(conn, &payout_id)?;
                    if !skip {
                        apply_wallet_op_tx(conn, &row.user_id, &effect.op, Some(&payout_id))?;
                    }
                }

                row.status = update.status.as_str().to_string();
                if update.amount.is_some() {
                    row.amount = update.amount.map(|a| a.to_string());
                }
                if update.reason.is_some() {
                    row.reason = update.reason;
                }
                if update.paid_at.is_some() {
                    row.paid_at = format_timestamp_opt(update.paid_at);
                }
                row.updated_at = format_timestamp(Utc::now());

                diesel::update(payouts::table.find(&payout_id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(Payout::from(row))
            })
            .await
    }
}
