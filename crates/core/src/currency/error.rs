//! Exchange rate resolution errors.

use chrono::NaiveDate;
use ledgerly_shared::types::CurrencyCode;
use thiserror::Error;

/// Errors raised while resolving, fetching or caching exchange rates.
#[derive(Debug, Error)]
pub enum RateError {
    /// Neither the cache nor any source produced a rate for the pair.
    #[error("No exchange rate for {from} to {to} on {date}")]
    Unavailable {
        /// Source currency.
        from: CurrencyCode,
        /// Target currency.
        to: CurrencyCode,
        /// Requested day.
        date: NaiveDate,
    },

    /// No source produced a full rate table for the base currency.
    #[error("No rate table available for base {0}")]
    TableUnavailable(CurrencyCode),

    /// A single quote source failed.
    #[error("Rate source '{source_name}' failed: {message}")]
    Source {
        /// Name of the failing source.
        source_name: String,
        /// Failure detail.
        message: String,
    },

    /// The persistent rate cache failed.
    #[error("Rate cache failure: {0}")]
    Cache(String),
}

impl RateError {
    /// Builds a `Source` error.
    pub fn source_failed(source_name: impl Into<String>, message: impl ToString) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }
}
