//! Pure monthly payout computation.
//!
//! No I/O and no mutable state: the same `(principal, month_index, rule,
//! booster_applied)` always produces the same breakdown, which is what
//! makes golden-value regression tests and persistence-free previews
//! possible.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::{Error, Result, ValidationError};
use crate::rules::PlanRule;
use crate::utils::round_to_minor_units;

/// Result of one monthly payout computation.
///
/// `gross_monthly`, `admin_charge_amount` and `booster_amount` are exact;
/// rounding happens exactly once, on `net_payout`. Rounding each
/// intermediate would drift over a multi-month schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutBreakdown {
    pub gross_monthly: Decimal,
    pub admin_charge_amount: Decimal,
    pub booster_amount: Decimal,
    pub net_payout: Decimal,
    /// The rate that was selected (band or special tier).
    pub monthly_rate: Decimal,
}

/// Computes the payout for `month_index` (1-based) of an investment.
///
/// Tier selection: a principal at or above `rule.special_min` earns
/// `rule.special_rate` for every month; otherwise the band covering
/// `month_index` applies. Band coverage is checked first either way, so a
/// month outside the configured schedule always fails with
/// `OutOfRangeMonth`.
pub fn compute_payout(
    principal: Decimal,
    month_index: u32,
    rule: &PlanRule,
    booster_applied: bool,
) -> Result<PayoutBreakdown> {
    if principal < Decimal::ZERO {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Principal cannot be negative, got {}",
            principal
        ))));
    }
    if month_index == 0 {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Month index starts at 1".to_string(),
        )));
    }

    let band = rule
        .band_for_month(month_index)
        .ok_or(Error::OutOfRangeMonth { month_index })?;

    let monthly_rate = if rule.has_special_tier() && principal >= rule.special_min {
        rule.special_rate
    } else {
        band.monthly_rate
    };

    let gross_monthly = principal * monthly_rate;
    let admin_charge_amount = gross_monthly * rule.admin_charge;
    let booster_amount = if booster_applied {
        gross_monthly * rule.booster
    } else {
        Decimal::ZERO
    };
    let net_payout = round_to_minor_units(gross_monthly - admin_charge_amount + booster_amount);

    Ok(PayoutBreakdown {
        gross_monthly,
        admin_charge_amount,
        booster_amount,
        net_payout,
        monthly_rate,
    })
}
