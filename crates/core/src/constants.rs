/// Reserved account id that platform-revenue ledger entries are booked against
pub const PLATFORM_ACCOUNT_ID: &str = "PLATFORM";

/// Minor-unit precision for amounts (paise)
pub const MINOR_UNIT_DECIMALS: u32 = 2;

/// Currency used when no setting is stored
pub const DEFAULT_CURRENCY: &str = "INR";

/// Withdrawal charge rate applied when none is configured
pub const DEFAULT_WITHDRAWAL_CHARGE_RATE: &str = "0.05";

/// TDS rate applied when none is configured (section 194A flat rate)
pub const DEFAULT_WITHDRAWAL_TDS_RATE: &str = "0.10";

/// Smallest withdrawal the platform accepts when none is configured
pub const DEFAULT_MIN_WITHDRAWAL_AMOUNT: &str = "500";
