//! Database models for scheduled payouts.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use payvest_core::payouts::{Payout, PayoutStatus};
use payvest_core::utils::parse_decimal_string_tolerant;

use crate::utils::{format_timestamp, format_timestamp_opt, parse_timestamp, parse_timestamp_opt};

/// Database model for one scheduled monthly payout.
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
#[diesel(table_name = crate::schema::payouts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PayoutDB {
    pub id: String,
    pub investment_id: String,
    pub user_id: String,
    pub month_no: i32,
    pub due_date: String,
    pub principal: String,
    pub booster_applied: bool,
    pub amount: Option<String>,
    pub status: String,
    pub reason: Option<String>,
    pub paid_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

// Conversion to domain model
impl From<PayoutDB> for Payout {
    fn from(db: PayoutDB) -> Self {
        let status = PayoutStatus::parse(&db.status).unwrap_or_else(|_| {
            log::error!("Unknown status '{}' on payout {}", db.status, db.id);
            PayoutStatus::Failed
        });
        Payout {
            id: db.id,
            investment_id: db.investment_id,
            user_id: db.user_id,
            month_no: db.month_no.max(0) as u32,
            due_date: parse_timestamp(&db.due_date, "payout.due_date"),
            principal: parse_decimal_string_tolerant(&db.principal, "payout.principal"),
            booster_applied: db.booster_applied,
            amount: db
                .amount
                .as_deref()
                .map(|raw| parse_decimal_string_tolerant(raw, "payout.amount")),
            status,
            reason: db.reason,
            paid_at: parse_timestamp_opt(db.paid_at.as_deref(), "payout.paid_at"),
            created_at: parse_timestamp(&db.created_at, "payout.created_at"),
            updated_at: parse_timestamp(&db.updated_at, "payout.updated_at"),
        }
    }
}

impl From<Payout> for PayoutDB {
    fn from(domain: Payout) -> Self {
        PayoutDB {
            id: domain.id,
            investment_id: domain.investment_id,
            user_id: domain.user_id,
            month_no: domain.month_no as i32,
            due_date: format_timestamp(domain.due_date),
            principal: domain.principal.to_string(),
            booster_applied: domain.booster_applied,
            amount: domain.amount.map(|a| a.to_string()),
            status: domain.status.as_str().to_string(),
            reason: domain.reason,
            paid_at: format_timestamp_opt(domain.paid_at),
            created_at: format_timestamp(domain.created_at),
            updated_at: format_timestamp(domain.updated_at),
        }
    }
}
