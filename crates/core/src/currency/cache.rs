//! Persistent exchange rate cache.

use async_trait::async_trait;
use chrono::NaiveDate;
use ledgerly_shared::types::CurrencyCode;
use rust_decimal::Decimal;

use super::error::RateError;
use super::exchange::ExchangeRate;

/// Outcome of a first-write-wins insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheWrite {
    /// The rate was stored.
    Inserted,
    /// A rate for the same (from, to, date) already existed and was kept.
    AlreadyPresent,
}

/// Durable store of resolved rates keyed by (from, to, calendar day).
#[async_trait]
pub trait RateCache: Send + Sync {
    /// Looks up a cached rate.
    async fn get(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        date: NaiveDate,
    ) -> Result<Option<Decimal>, RateError>;

    /// Stores a rate unless one exists for the same key.
    ///
    /// A duplicate key is reported as [`CacheWrite::AlreadyPresent`], never as an error.
    async fn insert(&self, rate: &ExchangeRate) -> Result<CacheWrite, RateError>;

    /// Inserts or overwrites every rate in one atomic write. Returns the number written.
    async fn upsert_many(&self, rates: &[ExchangeRate]) -> Result<usize, RateError>;
}
