//! Plan rule domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// A contiguous month range carrying one monthly interest rate.
///
/// Both ends are inclusive; `monthly_rate` is a fraction (0.04 = 4%/month).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateBand {
    pub from_month: u32,
    pub to_month: u32,
    pub monthly_rate: Decimal,
}

impl RateBand {
    pub fn covers(&self, month_index: u32) -> bool {
        self.from_month <= month_index && month_index <= self.to_month
    }
}

/// Domain model for a versioned payout rule set.
///
/// At most one rule is `active` at any instant; activation flips the flag
/// on the new record and clears it on the previous holder atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRule {
    pub id: String,
    pub name: String,
    /// Smallest principal an investment may be accepted with.
    pub min_amount: Decimal,
    /// Principal at or above which `special_rate` replaces the band rate.
    /// A zero threshold disables the special tier.
    pub special_min: Decimal,
    pub special_rate: Decimal,
    pub bands: Vec<RateBand>,
    /// Fraction of the gross monthly return retained by the platform.
    pub admin_charge: Decimal,
    /// Extra fraction of the gross paid when the booster condition is met.
    pub booster: Decimal,
    pub active: bool,
    pub version: i32,
    pub effective_from: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlanRule {
    /// Returns the band covering `month_index`, first match by ascending
    /// `from_month`.
    pub fn band_for_month(&self, month_index: u32) -> Option<&RateBand> {
        self.bands.iter().find(|b| b.covers(month_index))
    }

    /// Highest month index any band covers.
    pub fn max_covered_month(&self) -> u32 {
        self.bands.iter().map(|b| b.to_month).max().unwrap_or(0)
    }

    pub fn has_special_tier(&self) -> bool {
        self.special_min > Decimal::ZERO
    }
}

/// Input model for drafting a new rule.
///
/// `version` is assigned by the store at creation; new drafts start
/// inactive and are promoted through `activate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlanRule {
    pub name: String,
    pub min_amount: Decimal,
    pub special_min: Decimal,
    pub special_rate: Decimal,
    pub bands: Vec<RateBand>,
    pub admin_charge: Decimal,
    pub booster: Decimal,
    pub effective_from: Option<DateTime<Utc>>,
}

impl NewPlanRule {
    /// Validates the draft before it is accepted into the store.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Rule name cannot be empty".to_string(),
            )));
        }
        if self.min_amount < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Minimum amount cannot be negative".to_string(),
            )));
        }
        if self.special_min < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Special tier minimum cannot be negative".to_string(),
            )));
        }
        validate_fraction(self.special_rate, "specialRate")?;
        validate_fraction(self.admin_charge, "adminCharge")?;
        validate_fraction(self.booster, "booster")?;
        validate_bands(&self.bands)
    }
}

fn validate_fraction(value: Decimal, field: &str) -> Result<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "{} must be a fraction in [0, 1], got {}",
            field, value
        ))));
    }
    Ok(())
}

/// Validates a band table: ordered by `from_month` ascending, starting at
/// month 1, non-overlapping, and gap-free up to the highest `to_month`.
///
/// Overlap is a configuration error caught here, never at calculation time.
pub fn validate_bands(bands: &[RateBand]) -> Result<()> {
    if bands.is_empty() {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "At least one rate band is required".to_string(),
        )));
    }

    let mut expected_from = 1u32;
    for band in bands {
        if band.to_month < band.from_month {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Band {}-{} ends before it starts",
                band.from_month, band.to_month
            ))));
        }
        validate_fraction(band.monthly_rate, "monthlyRate")?;
        if band.from_month < expected_from {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Band {}-{} overlaps the previous band",
                band.from_month, band.to_month
            ))));
        }
        if band.from_month > expected_from {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Bands leave month {} uncovered",
                expected_from
            ))));
        }
        expected_from = band.to_month + 1;
    }
    Ok(())
}
