//! Database models for withdrawals.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use payvest_core::utils::parse_decimal_string_tolerant;
use payvest_core::withdrawals::{Withdrawal, WithdrawalSource, WithdrawalStatus};

use crate::utils::{format_timestamp, format_timestamp_opt, parse_timestamp, parse_timestamp_opt};

/// Database model for a withdrawal request.
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
#[diesel(table_name = crate::schema::withdrawals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalDB {
    pub id: String,
    pub user_id: String,
    pub amount: String,
    pub source: String,
    pub charges: String,
    pub tds: String,
    pub net_amount: String,
    pub status: String,
    pub reason: Option<String>,
    pub paid_at: Option<String>,
    pub rrn: Option<String>,
    pub gateway: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

// Conversion to domain model
impl From<WithdrawalDB> for Withdrawal {
    fn from(db: WithdrawalDB) -> Self {
        let status = WithdrawalStatus::parse(&db.status).unwrap_or_else(|_| {
            log::error!("Unknown status '{}' on withdrawal {}", db.status, db.id);
            WithdrawalStatus::Failed
        });
        let source = WithdrawalSource::parse(&db.source).unwrap_or_else(|_| {
            log::error!("Unknown source '{}' on withdrawal {}", db.source, db.id);
            WithdrawalSource::Earnings
        });
        Withdrawal {
            id: db.id,
            user_id: db.user_id,
            amount: parse_decimal_string_tolerant(&db.amount, "withdrawal.amount"),
            source,
            charges: parse_decimal_string_tolerant(&db.charges, "withdrawal.charges"),
            tds: parse_decimal_string_tolerant(&db.tds, "withdrawal.tds"),
            net_amount: parse_decimal_string_tolerant(&db.net_amount, "withdrawal.net_amount"),
            status,
            reason: db.reason,
            paid_at: parse_timestamp_opt(db.paid_at.as_deref(), "withdrawal.paid_at"),
            rrn: db.rrn,
            gateway: db.gateway,
            created_at: parse_timestamp(&db.created_at, "withdrawal.created_at"),
            updated_at: parse_timestamp(&db.updated_at, "withdrawal.updated_at"),
        }
    }
}

impl From<Withdrawal> for WithdrawalDB {
    fn from(domain: Withdrawal) -> Self {
        WithdrawalDB {
            id: domain.id,
            user_id: domain.user_id,
            amount: domain.amount.to_string(),
            source: domain.source.as_str().to_string(),
            charges: domain.charges.to_string(),
            tds: domain.tds.to_string(),
            net_amount: domain.net_amount.to_string(),
            status: domain.status.as_str().to_string(),
            reason: domain.reason,
            paid_at: format_timestamp_opt(domain.paid_at),
            rrn: domain.rrn,
            gateway: domain.gateway,
            created_at: format_timestamp(domain.created_at),
            updated_at: format_timestamp(domain.updated_at),
        }
    }
}
