//! Settings domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// Setting keys as stored
pub const SETTING_BASE_CURRENCY: &str = "base_currency";
pub const SETTING_WITHDRAWAL_CHARGE_RATE: &str = "withdrawal_charge_rate";
pub const SETTING_WITHDRAWAL_TDS_RATE: &str = "withdrawal_tds_rate";
pub const SETTING_MIN_WITHDRAWAL_AMOUNT: &str = "min_withdrawal_amount";

/// Platform configuration as one typed view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub base_currency: String,
    pub withdrawal_charge_rate: Decimal,
    pub withdrawal_tds_rate: Decimal,
    pub min_withdrawal_amount: Decimal,
}

/// Partial settings update; omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub base_currency: Option<String>,
    pub withdrawal_charge_rate: Option<Decimal>,
    pub withdrawal_tds_rate: Option<Decimal>,
    pub min_withdrawal_amount: Option<Decimal>,
}

/// The slice of settings a withdrawal request is priced with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalTerms {
    pub charge_rate: Decimal,
    pub tds_rate: Decimal,
    pub min_withdrawal: Decimal,
}
