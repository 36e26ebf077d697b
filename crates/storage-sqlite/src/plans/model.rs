//! Database models for investment plans.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use payvest_core::plans::InvestmentPlan;
use payvest_core::utils::parse_decimal_string_tolerant;

use crate::utils::parse_timestamp;

/// Database model for an investment plan.
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
#[diesel(table_name = crate::schema::investment_plans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct InvestmentPlanDB {
    pub id: String,
    pub title: String,
    pub start_month: i32,
    pub end_month: i32,
    pub annual_return_percent: String,
    pub min_investment: String,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: String,
    pub updated_at: String,
}

// Conversion to domain model
impl From<InvestmentPlanDB> for InvestmentPlan {
    fn from(db: InvestmentPlanDB) -> Self {
        InvestmentPlan {
            id: db.id,
            title: db.title,
            start_month: db.start_month.max(0) as u32,
            end_month: db.end_month.max(0) as u32,
            annual_return_percent: parse_decimal_string_tolerant(
                &db.annual_return_percent,
                "investment_plan.annual_return_percent",
            ),
            min_investment: parse_decimal_string_tolerant(
                &db.min_investment,
                "investment_plan.min_investment",
            ),
            is_active: db.is_active,
            sort_order: db.sort_order,
            created_at: parse_timestamp(&db.created_at, "investment_plan.created_at"),
            updated_at: parse_timestamp(&db.updated_at, "investment_plan.updated_at"),
        }
    }
}
