//! Shared helpers for money handling.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::constants::MINOR_UNIT_DECIMALS;

/// Rounds an amount to minor units (paise) using round-half-up.
///
/// This is the only rounding the engine performs on money; intermediate
/// figures stay exact decimals.
pub fn round_to_minor_units(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MINOR_UNIT_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses a stored decimal string, with support for scientific notation.
///
/// Falls back to ZERO on unparseable input rather than failing the whole
/// row load; the failure is logged for reconciliation.
pub fn parse_decimal_string_tolerant(value_str: &str, field_name: &str) -> Decimal {
    match Decimal::from_str(value_str) {
        Ok(d) => d,
        Err(e_decimal) => match Decimal::from_scientific(value_str) {
            Ok(d) => d,
            Err(e_scientific) => {
                log::error!(
                    "Failed to parse {} '{}': as Decimal (err: {}), and as scientific (err: {}). Falling back to ZERO.",
                    field_name,
                    value_str,
                    e_decimal,
                    e_scientific
                );
                Decimal::ZERO
            }
        },
    }
}
