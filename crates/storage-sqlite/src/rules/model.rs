//! Database models for plan rules.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use payvest_core::rules::{PlanRule, RateBand};
use payvest_core::utils::parse_decimal_string_tolerant;

use crate::utils::parse_timestamp;

/// Database model for a plan rule.
///
/// `bands` is the JSON-encoded band table; decimals are stored as text to
/// keep them exact.
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
#[diesel(table_name = crate::schema::plan_rules)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PlanRuleDB {
    pub id: String,
    pub name: String,
    pub min_amount: String,
    pub special_min: String,
    pub special_rate: String,
    pub bands: String,
    pub admin_charge: String,
    pub booster: String,
    pub is_active: bool,
    pub version: i32,
    pub effective_from: String,
    pub created_at: String,
    pub updated_at: String,
}

// Conversion to domain model
impl From<PlanRuleDB> for PlanRule {
    fn from(db: PlanRuleDB) -> Self {
        let bands: Vec<RateBand> = serde_json::from_str(&db.bands).unwrap_or_else(|e| {
            log::error!("Corrupt band table on rule {}: {}", db.id, e);
            Vec::new()
        });
        PlanRule {
            id: db.id,
            name: db.name,
            min_amount: parse_decimal_string_tolerant(&db.min_amount, "plan_rule.min_amount"),
            special_min: parse_decimal_string_tolerant(&db.special_min, "plan_rule.special_min"),
            special_rate: parse_decimal_string_tolerant(&db.special_rate, "plan_rule.special_rate"),
            bands,
            admin_charge: parse_decimal_string_tolerant(&db.admin_charge, "plan_rule.admin_charge"),
            booster: parse_decimal_string_tolerant(&db.booster, "plan_rule.booster"),
            active: db.is_active,
            version: db.version,
            effective_from: parse_timestamp(&db.effective_from, "plan_rule.effective_from"),
            created_at: parse_timestamp(&db.created_at, "plan_rule.created_at"),
            updated_at: parse_timestamp(&db.updated_at, "plan_rule.updated_at"),
        }
    }
}
