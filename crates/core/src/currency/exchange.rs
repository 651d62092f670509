//! Exchange rate and conversion result types.

use chrono::NaiveDate;
use ledgerly_shared::types::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::service::CurrencyService;

/// Exchange rate between two currencies on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Source currency code.
    pub from_currency: CurrencyCode,
    /// Target currency code.
    pub to_currency: CurrencyCode,
    /// Exchange rate (1 from_currency = rate to_currency).
    pub rate: Decimal,
    /// Day this rate is keyed on.
    pub rate_date: NaiveDate,
}

impl ExchangeRate {
    /// Creates a new exchange rate.
    #[must_use]
    pub const fn new(
        from_currency: CurrencyCode,
        to_currency: CurrencyCode,
        rate: Decimal,
        rate_date: NaiveDate,
    ) -> Self {
        Self {
            from_currency,
            to_currency,
            rate,
            rate_date,
        }
    }

    /// Returns the inverse rate, or `None` for a zero rate.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        Some(Self {
            from_currency: self.to_currency.clone(),
            to_currency: self.from_currency.clone(),
            rate: CurrencyService::inverse(self.rate)?,
            rate_date: self.rate_date,
        })
    }
}

/// Result of converting an amount between two currencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    /// Amount before conversion.
    pub original_amount: Decimal,
    /// Amount after conversion, rounded to 4 dp.
    pub converted_amount: Decimal,
    /// Source currency.
    pub from_currency: CurrencyCode,
    /// Target currency.
    pub to_currency: CurrencyCode,
    /// Rate used.
    pub exchange_rate: Decimal,
    /// Rate date.
    pub date: NaiveDate,
}

/// A currency a source can quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    /// Currency code.
    pub code: CurrencyCode,
    /// Human-readable name.
    pub name: String,
}

impl CurrencyInfo {
    /// Creates a currency entry.
    #[must_use]
    pub fn new(code: CurrencyCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_inverse_swaps_pair() {
        let rate = ExchangeRate::new(
            CurrencyCode::parse("USD").unwrap(),
            CurrencyCode::parse("LKR").unwrap(),
            dec!(300),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        );
        let inverse = rate.inverse().unwrap();

        assert_eq!(inverse.from_currency.as_str(), "LKR");
        assert_eq!(inverse.to_currency.as_str(), "USD");
        assert_eq!(inverse.rate, Decimal::ONE / dec!(300));
        assert_eq!(inverse.rate_date, rate.rate_date);
    }

    #[test]
    fn test_conversion_wire_format() {
        let conversion = Conversion {
            original_amount: dec!(10),
            converted_amount: dec!(3000.0000),
            from_currency: CurrencyCode::parse("USD").unwrap(),
            to_currency: CurrencyCode::parse("LKR").unwrap(),
            exchange_rate: dec!(300),
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        };
        let json = serde_json::to_value(&conversion).unwrap();
        assert_eq!(json["converted_amount"], "3000.0000");
        assert_eq!(json["from_currency"], "USD");
    }
}
