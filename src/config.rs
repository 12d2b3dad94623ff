use std::str::FromStr;

use chrono::Duration;
use rust_decimal::Decimal;

use crate::domain::money::CurrencyCode;

// ============================================================================
// Configuration
// ============================================================================
//
// Pricing and delivery constants. Defaults match the storefront's published
// rules; every value can be overridden from the environment.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    /// Fraction of the subtotal charged as tax (0.08 = 8%)
    pub tax_rate: Decimal,
    /// Subtotal at or above which shipping is free
    pub free_shipping_threshold: Decimal,
    /// Flat shipping fee below the threshold
    pub shipping_cost: Decimal,
    pub currency: CurrencyCode,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(8, 2),
            free_shipping_threshold: Decimal::new(50, 0),
            shipping_cost: Decimal::new(999, 2),
            currency: CurrencyCode::USD,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryConfig {
    /// Provisional delivery estimate applied when an order is placed
    pub lead_time: Duration,
    /// Average courier speed used by the ETA estimator
    pub average_speed_kmh: f64,
    /// Fixed handling time added to every ETA
    pub buffer: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            lead_time: Duration::days(7),
            average_speed_kmh: 30.0,
            buffer: Duration::minutes(30),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub pricing: PricingConfig,
    pub delivery: DeliveryConfig,
}

impl AppConfig {
    /// Build a config from `STOREFRONT_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] but reads through `lookup`, which keeps
    /// tests away from the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("STOREFRONT_TAX_RATE") {
            config.pricing.tax_rate = parse("STOREFRONT_TAX_RATE", &value)?;
        }
        if let Some(value) = lookup("STOREFRONT_FREE_SHIPPING_THRESHOLD") {
            config.pricing.free_shipping_threshold = parse("STOREFRONT_FREE_SHIPPING_THRESHOLD", &value)?;
        }
        if let Some(value) = lookup("STOREFRONT_SHIPPING_COST") {
            config.pricing.shipping_cost = parse("STOREFRONT_SHIPPING_COST", &value)?;
        }
        if let Some(value) = lookup("STOREFRONT_CURRENCY") {
            config.pricing.currency = parse("STOREFRONT_CURRENCY", &value)?;
        }
        if let Some(value) = lookup("STOREFRONT_LEAD_TIME_DAYS") {
            config.delivery.lead_time = parse_duration("STOREFRONT_LEAD_TIME_DAYS", &value, Duration::try_days)?;
        }
        if let Some(value) = lookup("STOREFRONT_AVERAGE_SPEED_KMH") {
            let speed: f64 = parse("STOREFRONT_AVERAGE_SPEED_KMH", &value)?;
            if !speed.is_finite() || speed <= 0.0 {
                return Err(ConfigError::InvalidValue { key: "STOREFRONT_AVERAGE_SPEED_KMH", value });
            }
            config.delivery.average_speed_kmh = speed;
        }
        if let Some(value) = lookup("STOREFRONT_ETA_BUFFER_MINUTES") {
            config.delivery.buffer = parse_duration("STOREFRONT_ETA_BUFFER_MINUTES", &value, Duration::try_minutes)?;
        }

        if config.pricing.tax_rate.is_sign_negative() || config.pricing.shipping_cost.is_sign_negative() {
            return Err(ConfigError::InvalidValue {
                key: "STOREFRONT_TAX_RATE/STOREFRONT_SHIPPING_COST",
                value: "negative".to_string(),
            });
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Non-negative whole units, within chrono's range
fn parse_duration(key: &'static str, value: &str, unit: fn(i64) -> Option<Duration>) -> Result<Duration, ConfigError> {
    let amount: i64 = parse(key, value)?;
    if amount < 0 {
        return Err(ConfigError::InvalidValue { key, value: value.to_string() });
    }
    unit(amount).ok_or_else(|| ConfigError::InvalidValue { key, value: value.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.pricing.tax_rate, Decimal::new(8, 2));
        assert_eq!(config.pricing.free_shipping_threshold, Decimal::new(50, 0));
        assert_eq!(config.pricing.shipping_cost, Decimal::new(999, 2));
        assert_eq!(config.delivery.lead_time, Duration::days(7));
        assert_eq!(config.delivery.buffer, Duration::minutes(30));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("STOREFRONT_TAX_RATE", "0.10"),
            ("STOREFRONT_CURRENCY", "EUR"),
            ("STOREFRONT_LEAD_TIME_DAYS", "3"),
            ("STOREFRONT_AVERAGE_SPEED_KMH", "45.5"),
        ]))
        .unwrap();

        assert_eq!(config.pricing.tax_rate, Decimal::new(10, 2));
        assert_eq!(config.pricing.currency, CurrencyCode::EUR);
        assert_eq!(config.delivery.lead_time, Duration::days(3));
        assert_eq!(config.delivery.average_speed_kmh, 45.5);
        // untouched values keep their defaults
        assert_eq!(config.pricing.shipping_cost, Decimal::new(999, 2));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("STOREFRONT_TAX_RATE", "eight")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "STOREFRONT_TAX_RATE", .. }));

        let err = AppConfig::from_lookup(lookup_from(&[("STOREFRONT_AVERAGE_SPEED_KMH", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "STOREFRONT_AVERAGE_SPEED_KMH", .. }));

        assert!(AppConfig::from_lookup(lookup_from(&[("STOREFRONT_CURRENCY", "JPY")])).is_err());

        let err = AppConfig::from_lookup(lookup_from(&[("STOREFRONT_LEAD_TIME_DAYS", "9999999999999")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "STOREFRONT_LEAD_TIME_DAYS", .. }));

        let err = AppConfig::from_lookup(lookup_from(&[("STOREFRONT_LEAD_TIME_DAYS", "-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "STOREFRONT_LEAD_TIME_DAYS", .. }));

        let err = AppConfig::from_lookup(lookup_from(&[("STOREFRONT_ETA_BUFFER_MINUTES", "-600")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "STOREFRONT_ETA_BUFFER_MINUTES", .. }));

        let err = AppConfig::from_lookup(lookup_from(&[("STOREFRONT_ETA_BUFFER_MINUTES", "999999999999999")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "STOREFRONT_ETA_BUFFER_MINUTES", .. }));
        assert!(AppConfig::from_lookup(lookup_from(&[("STOREFRONT_SHIPPING_COST", "-1")])).is_err());
    }
}
