use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

// ============================================================================
// Money - decimal amounts in major currency units
// ============================================================================
//
// The cart and the order hold amounts in major units (dollars). Minor units
// (cents) only appear when an amount crosses the payment boundary.
//
// ============================================================================

/// Number of decimal places kept for monetary values
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Largest single charge the payment processor accepts (999,999.99)
pub const MAX_PAYMENT_AMOUNT: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

/// ISO 4217 currency codes supported by the payment processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(MoneyError::UnsupportedCurrency(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MoneyError {
    #[error("Amount must be greater than 0, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("Amount exceeds maximum limit: {0}")]
    AmountTooLarge(Decimal),

    #[error("Currency not supported: {0}")]
    UnsupportedCurrency(String),
}

/// Round to cents, half away from zero
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a major-unit amount to minor units (cents) for the payment boundary
pub fn to_minor_units(amount: Decimal) -> Result<i64, MoneyError> {
    round_money(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or(MoneyError::AmountTooLarge(amount))
}

/// Convert minor units (cents) back to a major-unit amount
pub fn from_minor_units(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_DECIMAL_PLACES)
}

/// Check an amount is chargeable before a payment intent is created
pub fn validate_payment_amount(amount: Decimal) -> Result<(), MoneyError> {
    if amount <= Decimal::ZERO {
        return Err(MoneyError::NonPositiveAmount(amount));
    }
    if amount > MAX_PAYMENT_AMOUNT {
        return Err(MoneyError::AmountTooLarge(amount));
    }
    Ok(())
}

/// Format for display, e.g. `"$54.00"`
pub fn format_amount(amount: Decimal, currency: CurrencyCode) -> String {
    let rounded = round_money(amount);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{}{:.2}", currency.symbol(), rounded.abs())
    } else {
        format!("{}{:.2}", currency.symbol(), rounded)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2));
        assert_eq!(round_money(Decimal::new(12344, 3)), Decimal::new(1234, 2));
        assert_eq!(round_money(Decimal::new(-12345, 3)), Decimal::new(-1235, 2));
    }

    #[test]
    fn test_minor_unit_conversion() {
        assert_eq!(to_minor_units(Decimal::new(5400, 2)).unwrap(), 5400);
        assert_eq!(to_minor_units(Decimal::new(1999, 2)).unwrap(), 1999);
        // sub-cent amounts are rounded before scaling
        assert_eq!(to_minor_units(Decimal::new(10005, 3)).unwrap(), 1001);
        assert_eq!(from_minor_units(5400), Decimal::new(54, 0));
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(Decimal::new(1, 2)).is_ok());
        assert!(validate_payment_amount(MAX_PAYMENT_AMOUNT).is_ok());
        assert_eq!(
            validate_payment_amount(Decimal::ZERO),
            Err(MoneyError::NonPositiveAmount(Decimal::ZERO))
        );
        assert!(matches!(
            validate_payment_amount(Decimal::new(100_000_000, 2)),
            Err(MoneyError::AmountTooLarge(_))
        ));
    }

    #[test]
    fn test_currency_parsing_is_case_insensitive() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!("Gbp".parse::<CurrencyCode>().unwrap(), CurrencyCode::GBP);
        assert_eq!(
            "jpy".parse::<CurrencyCode>(),
            Err(MoneyError::UnsupportedCurrency("jpy".to_string()))
        );
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(54, 0), CurrencyCode::USD), "$54.00");
        assert_eq!(format_amount(Decimal::new(999, 2), CurrencyCode::EUR), "€9.99");
        assert_eq!(format_amount(Decimal::new(-5, 1), CurrencyCode::GBP), "-£0.50");
    }
}
