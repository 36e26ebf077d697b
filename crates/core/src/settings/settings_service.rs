use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use super::settings_model::{
    Settings, SettingsUpdate, WithdrawalTerms, SETTING_BASE_CURRENCY,
    SETTING_MIN_WITHDRAWAL_AMOUNT, SETTING_WITHDRAWAL_CHARGE_RATE, SETTING_WITHDRAWAL_TDS_RATE,
};
use super::settings_traits::SettingsRepositoryTrait;
use crate::constants::{
    DEFAULT_CURRENCY, DEFAULT_MIN_WITHDRAWAL_AMOUNT, DEFAULT_WITHDRAWAL_CHARGE_RATE,
    DEFAULT_WITHDRAWAL_TDS_RATE,
};
use crate::errors::{DatabaseError, Error, Result, ValidationError};

// Define the trait for SettingsService
#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    fn get_settings(&self) -> Result<Settings>;

    async fn update_settings(&self, new_settings: &SettingsUpdate) -> Result<()>;

    fn get_base_currency(&self) -> Result<String>;

    /// The rates and floor a new withdrawal is priced with.
    fn get_withdrawal_terms(&self) -> Result<WithdrawalTerms>;
}

pub struct SettingsService {
    settings_repository: Arc<dyn SettingsRepositoryTrait>,
}

impl SettingsService {
    pub fn new(settings_repository: Arc<dyn SettingsRepositoryTrait>) -> Self {
        SettingsService {
            settings_repository,
        }
    }

    /// Reads a setting, falling back to the compiled default when the key
    /// was never stored.
    fn get_or_default(&self, key: &str, default: &str) -> Result<String> {
        match self.settings_repository.get_setting(key) {
            Ok(value) => Ok(value),
            Err(Error::Database(DatabaseError::NotFound(_))) => Ok(default.to_string()),
            Err(e) => Err(e),
        }
    }

    fn get_decimal(&self, key: &str, default: &str) -> Result<Decimal> {
        let raw = self.get_or_default(key, default)?;
        Decimal::from_str(&raw).map_err(|e| {
            Error::Validation(ValidationError::InvalidInput(format!(
                "Setting {} holds '{}': {}",
                key, raw, e
            )))
        })
    }
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    fn get_settings(&self) -> Result<Settings> {
        Ok(Settings {
            base_currency: self.get_base_currency()?,
            withdrawal_charge_rate: self
                .get_decimal(SETTING_WITHDRAWAL_CHARGE_RATE, DEFAULT_WITHDRAWAL_CHARGE_RATE)?,
            withdrawal_tds_rate: self
                .get_decimal(SETTING_WITHDRAWAL_TDS_RATE, DEFAULT_WITHDRAWAL_TDS_RATE)?,
            min_withdrawal_amount: self
                .get_decimal(SETTING_MIN_WITHDRAWAL_AMOUNT, DEFAULT_MIN_WITHDRAWAL_AMOUNT)?,
        })
    }

    async fn update_settings(&self, new_settings: &SettingsUpdate) -> Result<()> {
        if let Some(ref currency) = new_settings.base_currency {
            self.settings_repository
                .update_setting(SETTING_BASE_CURRENCY, currency)
                .await?;
        }
        if let Some(rate) = new_settings.withdrawal_charge_rate {
            validate_fraction_setting(rate, SETTING_WITHDRAWAL_CHARGE_RATE)?;
            self.settings_repository
                .update_setting(SETTING_WITHDRAWAL_CHARGE_RATE, &rate.to_string())
                .await?;
        }
        if let Some(rate) = new_settings.withdrawal_tds_rate {
            validate_fraction_setting(rate, SETTING_WITHDRAWAL_TDS_RATE)?;
            self.settings_repository
                .update_setting(SETTING_WITHDRAWAL_TDS_RATE, &rate.to_string())
                .await?;
        }
        if let Some(amount) = new_settings.min_withdrawal_amount {
            if amount < Decimal::ZERO {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Minimum withdrawal cannot be negative".to_string(),
                )));
            }
            self.settings_repository
                .update_setting(SETTING_MIN_WITHDRAWAL_AMOUNT, &amount.to_string())
                .await?;
        }
        Ok(())
    }

    fn get_base_currency(&self) -> Result<String> {
        self.get_or_default(SETTING_BASE_CURRENCY, DEFAULT_CURRENCY)
    }

    fn get_withdrawal_terms(&self) -> Result<WithdrawalTerms> {
        Ok(WithdrawalTerms {
            charge_rate: self
                .get_decimal(SETTING_WITHDRAWAL_CHARGE_RATE, DEFAULT_WITHDRAWAL_CHARGE_RATE)?,
            tds_rate: self.get_decimal(SETTING_WITHDRAWAL_TDS_RATE, DEFAULT_WITHDRAWAL_TDS_RATE)?,
            min_withdrawal: self
                .get_decimal(SETTING_MIN_WITHDRAWAL_AMOUNT, DEFAULT_MIN_WITHDRAWAL_AMOUNT)?,
        })
    }
}

fn validate_fraction_setting(value: Decimal, key: &str) -> Result<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Setting {} must be a fraction in [0, 1], got {}",
            key, value
        ))));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::RwLock;

    struct MockSettingsRepository {
        values: RwLock<HashMap<String, String>>,
    }

    impl MockSettingsRepository {
        fn new() -> Self {
            Self {
                values: RwLock::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl SettingsRepositoryTrait for MockSettingsRepository {
        fn get_setting(&self, setting_key: &str) -> Result<String> {
            self.values
                .read()
                .unwrap()
                .get(setting_key)
                .cloned()
                .ok_or_else(|| {
                    Error::Database(DatabaseError::NotFound(setting_key.to_string()))
                })
        }

        async fn update_setting(&self, setting_key: &str, setting_value: &str) -> Result<()> {
            self.values
                .write()
                .unwrap()
                .insert(setting_key.to_string(), setting_value.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_defaults_when_nothing_stored() {
        let service = SettingsService::new(Arc::new(MockSettingsRepository::new()));
        let settings = service.get_settings().unwrap();
        assert_eq!(settings.base_currency, "INR");
        assert_eq!(settings.withdrawal_charge_rate, dec!(0.05));
        assert_eq!(settings.withdrawal_tds_rate, dec!(0.10));
        assert_eq!(settings.min_withdrawal_amount, dec!(500));
    }

    #[tokio::test]
    async fn test_update_and_read_back() {
        let service = SettingsService::new(Arc::new(MockSettingsRepository::new()));
        let update = SettingsUpdate {
            base_currency: None,
            withdrawal_charge_rate: Some(dec!(0.02)),
            withdrawal_tds_rate: Some(dec!(0.05)),
            min_withdrawal_amount: Some(dec!(1000)),
        };
        service.update_settings(&update).await.unwrap();

        let terms = service.get_withdrawal_terms().unwrap();
        assert_eq!(terms.charge_rate, dec!(0.02));
        assert_eq!(terms.tds_rate, dec!(0.05));
        assert_eq!(terms.min_withdrawal, dec!(1000));
    }

    #[tokio::test]
    async fn test_rates_must_be_fractions() {
        let service = SettingsService::new(Arc::new(MockSettingsRepository::new()));
        let update = SettingsUpdate {
            withdrawal_charge_rate: Some(dec!(1.5)),
            ..Default::default()
        };
        assert!(service.update_settings(&update).await.is_err());
    }

    #[test]
    fn test_garbage_stored_value_is_an_error() {
        let repo = Arc::new(MockSettingsRepository::new());
        repo.values.write().unwrap().insert(
            SETTING_WITHDRAWAL_TDS_RATE.to_string(),
            "ten percent".to_string(),
        );
        let service = SettingsService::new(repo);
        assert!(service.get_withdrawal_terms().is_err());
    }
}
