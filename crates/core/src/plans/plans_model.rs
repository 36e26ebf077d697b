//! Investment plan domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{ConflictError, Error, Result, ValidationError};

/// Catalog entry an investor picks from; distinct from the payout rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentPlan {
    pub id: String,
    pub title: String,
    /// Inclusive tenure range in months this plan covers.
    pub start_month: u32,
    pub end_month: u32,
    pub annual_return_percent: Decimal,
    pub min_investment: Decimal,
    pub is_active: bool,
    /// Dense display rank; swapped atomically, never edited pairwise.
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for creating a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvestmentPlan {
    pub title: String,
    pub start_month: u32,
    pub end_month: u32,
    pub annual_return_percent: Decimal,
    pub min_investment: Decimal,
    pub is_active: bool,
    /// Appended after the current highest rank when omitted.
    pub sort_order: Option<i32>,
}

impl NewInvestmentPlan {
    pub fn validate(&self) -> Result<()> {
        validate_plan_fields(
            &self.title,
            self.start_month,
            self.end_month,
            self.annual_return_percent,
            self.min_investment,
        )
    }
}

/// Input model for updating a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentPlanUpdate {
    pub id: String,
    pub title: String,
    pub start_month: u32,
    pub end_month: u32,
    pub annual_return_percent: Decimal,
    pub min_investment: Decimal,
    pub is_active: bool,
}

impl InvestmentPlanUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        validate_plan_fields(
            &self.title,
            self.start_month,
            self.end_month,
            self.annual_return_percent,
            self.min_investment,
        )
    }
}

fn validate_plan_fields(
    title: &str,
    start_month: u32,
    end_month: u32,
    annual_return_percent: Decimal,
    min_investment: Decimal,
) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Plan title cannot be empty".to_string(),
        )));
    }
    if start_month == 0 {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Plan months start at 1".to_string(),
        )));
    }
    if end_month < start_month {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Plan range {}-{} ends before it starts",
            start_month, end_month
        ))));
    }
    if annual_return_percent < Decimal::ZERO {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Annual return cannot be negative".to_string(),
        )));
    }
    if min_investment < Decimal::ZERO {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Minimum investment cannot be negative".to_string(),
        )));
    }
    Ok(())
}

/// Inclusive range intersection test.
pub fn ranges_overlap(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Rejects a candidate range that intersects any *active* plan's range.
///
/// `exclude_id` skips the plan being updated. Inactive plans never
/// conflict. Runs inside the store transaction so a concurrent create
/// cannot slip past the check.
pub fn check_range_conflict(
    existing: &[InvestmentPlan],
    start_month: u32,
    end_month: u32,
    exclude_id: Option<&str>,
) -> Result<()> {
    for plan in existing.iter().filter(|p| p.is_active) {
        if exclude_id == Some(plan.id.as_str()) {
            continue;
        }
        if ranges_overlap(start_month, end_month, plan.start_month, plan.end_month) {
            return Err(Error::Conflict(ConflictError::PlanOverlap {
                start_month,
                end_month,
                existing_title: plan.title.clone(),
            }));
        }
    }
    Ok(())
}
