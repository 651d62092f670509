//! Quote sources.
//!
//! A [`QuoteSource`] returns the full table of rates for one base currency.
//! The resolver keeps an ordered list of them and takes the first success.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use ledgerly_shared::types::CurrencyCode;
use rust_decimal::Decimal;

use super::error::RateError;
use super::exchange::CurrencyInfo;

/// Rates published for one base currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    /// Base currency (1 base = rate target).
    pub base: CurrencyCode,
    /// Publication date reported by the source, if any.
    pub date: Option<NaiveDate>,
    /// Target currency to rate.
    pub rates: BTreeMap<CurrencyCode, Decimal>,
}

impl RateTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new(base: CurrencyCode) -> Self {
        Self {
            base,
            date: None,
            rates: BTreeMap::new(),
        }
    }

    /// Adds a rate, returning the table for chaining.
    #[must_use]
    pub fn with_rate(mut self, target: CurrencyCode, rate: Decimal) -> Self {
        self.rates.insert(target, rate);
        self
    }

    /// Returns the rate for `target` when it is strictly positive.
    #[must_use]
    pub fn rate_for(&self, target: &CurrencyCode) -> Option<Decimal> {
        self.rates
            .get(target)
            .copied()
            .filter(|rate| rate.is_sign_positive() && !rate.is_zero())
    }

    /// Iterates over usable quotes: positive rates for currencies other than the base.
    pub fn quotes(&self) -> impl Iterator<Item = (&CurrencyCode, Decimal)> {
        self.rates
            .iter()
            .filter(|(code, rate)| **code != self.base && rate.is_sign_positive() && !rate.is_zero())
            .map(|(code, rate)| (code, *rate))
    }
}

/// A provider of exchange rate tables.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Fetches every rate published for `base`.
    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<RateTable, RateError>;

    /// Fetches the currencies this source can quote.
    async fn fetch_currencies(&self) -> Result<Vec<CurrencyInfo>, RateError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    #[test]
    fn test_rate_for_rejects_non_positive() {
        let table = RateTable::new(code("USD"))
            .with_rate(code("LKR"), dec!(300))
            .with_rate(code("EUR"), dec!(0))
            .with_rate(code("GBP"), dec!(-1));

        assert_eq!(table.rate_for(&code("LKR")), Some(dec!(300)));
        assert_eq!(table.rate_for(&code("EUR")), None);
        assert_eq!(table.rate_for(&code("GBP")), None);
        assert_eq!(table.rate_for(&code("JPY")), None);
    }

    #[test]
    fn test_quotes_skip_self_pair() {
        let table = RateTable::new(code("USD"))
            .with_rate(code("USD"), dec!(1))
            .with_rate(code("LKR"), dec!(300))
            .with_rate(code("EUR"), dec!(0.9));

        let targets: Vec<&str> = table.quotes().map(|(c, _)| c.as_str()).collect();
        assert_eq!(targets, vec!["EUR", "LKR"]);
    }
}
