use crate::error::PaymentError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency used when the host does not specify one.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Number of subunits per major unit (paise per rupee).
const SUBUNITS_PER_UNIT: Decimal = dec!(100);

/// Represents a positive monetary amount in the currency's major unit.
///
/// Ensures that amounts handed to the gateway are always positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::InvalidInput(format!(
                "amount must be positive, got {value}"
            )))
        }
    }

    /// Converts to integer subunits: `amount * 100`, rounded half away from zero.
    ///
    /// `500.005` becomes `50001`. Amounts that round to zero or overflow are rejected.
    pub fn to_subunits(&self) -> Result<i64, PaymentError> {
        let subunits = self
            .0
            .checked_mul(SUBUNITS_PER_UNIT)
            .ok_or_else(|| self.out_of_range())?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        match subunits.to_i64() {
            Some(value) if value > 0 => Ok(value),
            Some(_) => Err(PaymentError::InvalidInput(format!(
                "amount {} is smaller than one subunit",
                self.0
            ))),
            None => Err(self.out_of_range()),
        }
    }

    fn out_of_range(&self) -> PaymentError {
        PaymentError::InvalidInput(format!("amount {} does not fit in subunits", self.0))
    }
}

/// Uppercase ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: &str) -> Result<Self, PaymentError> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(PaymentError::InvalidInput(format!(
                "currency code must be three letters, got {code:?}"
            )));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Normalizes an optional code, falling back to [`DEFAULT_CURRENCY`].
    pub fn or_default(code: Option<&str>) -> Result<Self, PaymentError> {
        match code.map(str::trim) {
            Some(code) if !code.is_empty() => Self::new(code),
            _ => Ok(Self(DEFAULT_CURRENCY.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self(DEFAULT_CURRENCY.to_string())
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = PaymentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(PaymentError::InvalidInput(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(PaymentError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_to_subunits() {
        assert_eq!(Amount::new(dec!(500.00)).unwrap().to_subunits().unwrap(), 50000);
        assert_eq!(Amount::new(dec!(1)).unwrap().to_subunits().unwrap(), 100);
        assert_eq!(Amount::new(dec!(19.99)).unwrap().to_subunits().unwrap(), 1999);
    }

    #[test]
    fn test_to_subunits_rounds_half_away_from_zero() {
        assert_eq!(Amount::new(dec!(10.005)).unwrap().to_subunits().unwrap(), 1001);
        assert_eq!(Amount::new(dec!(10.0049)).unwrap().to_subunits().unwrap(), 1000);
        assert_eq!(Amount::new(dec!(0.015)).unwrap().to_subunits().unwrap(), 2);
    }

    #[test]
    fn test_to_subunits_rejects_dust() {
        let dust = Amount::new(dec!(0.004)).unwrap();
        assert!(matches!(
            dust.to_subunits(),
            Err(PaymentError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_to_subunits_rejects_amounts_beyond_range() {
        let huge = Amount::new(Decimal::MAX).unwrap();
        assert!(matches!(
            huge.to_subunits(),
            Err(PaymentError::InvalidInput(msg)) if msg.contains("does not fit")
        ));

        // Multiplies fine but exceeds i64.
        let large = Amount::new(Decimal::from(100_000_000_000_000_000_i64)).unwrap();
        assert!(matches!(
            large.to_subunits(),
            Err(PaymentError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_currency_normalization() {
        assert_eq!(CurrencyCode::new("inr").unwrap().as_str(), "INR");
        assert_eq!(CurrencyCode::new(" usd ").unwrap().as_str(), "USD");
        assert_eq!(CurrencyCode::or_default(None).unwrap().as_str(), "INR");
        assert_eq!(CurrencyCode::or_default(Some("")).unwrap().as_str(), "INR");
        assert!(CurrencyCode::new("rupees").is_err());
        assert!(CurrencyCode::new("1NR").is_err());
    }
}
