//! Exchange rate resolver.
//!
//! Lookup order for a pair on a day:
//! 1. same currency short-circuits to 1
//! 2. in-process memo (moka)
//! 3. persistent [`RateCache`]
//! 4. each [`QuoteSource`] in order, first usable quote wins
//!
//! A fetched rate is written to the persistent cache before it is returned,
//! keyed on the date the source says it was published. Sources that only
//! serve current rates therefore never file today's rate under a past date.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use ledgerly_shared::types::CurrencyCode;
use moka::sync::Cache;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::cache::{CacheWrite, RateCache};
use super::error::RateError;
use super::exchange::{Conversion, CurrencyInfo, ExchangeRate};
use super::service::CurrencyService;
use super::source::{QuoteSource, RateTable};

/// Default memo capacity (number of pairs).
const DEFAULT_MEMO_CAPACITY: u64 = 10_000;

/// Default memo time-to-live (1 day).
const DEFAULT_MEMO_TTL_SECS: u64 = 86_400;

/// Currencies reported when no source can list them.
const FALLBACK_CURRENCIES: &[(&str, &str)] = &[
    ("USD", "US Dollar"),
    ("EUR", "Euro"),
    ("GBP", "British Pound"),
    ("JPY", "Japanese Yen"),
    ("AUD", "Australian Dollar"),
    ("CAD", "Canadian Dollar"),
    ("CHF", "Swiss Franc"),
    ("CNY", "Chinese Yuan"),
    ("INR", "Indian Rupee"),
    ("LKR", "Sri Lankan Rupee"),
    ("SGD", "Singapore Dollar"),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RateKey {
    from: CurrencyCode,
    to: CurrencyCode,
    date: NaiveDate,
}

impl RateKey {
    fn new(from: &CurrencyCode, to: &CurrencyCode, date: NaiveDate) -> Self {
        Self {
            from: from.clone(),
            to: to.clone(),
            date,
        }
    }
}

/// Resolves, converts and caches exchange rates.
pub struct ExchangeRateResolver {
    cache: Arc<dyn RateCache>,
    sources: Vec<Arc<dyn QuoteSource>>,
    memo: Cache<RateKey, Decimal>,
}

impl ExchangeRateResolver {
    /// Creates a resolver with the default memo settings.
    #[must_use]
    pub fn new(cache: Arc<dyn RateCache>, sources: Vec<Arc<dyn QuoteSource>>) -> Self {
        Self::with_memo(cache, sources, DEFAULT_MEMO_CAPACITY, DEFAULT_MEMO_TTL_SECS)
    }

    /// Creates a resolver with a custom memo size and TTL.
    #[must_use]
    pub fn with_memo(
        cache: Arc<dyn RateCache>,
        sources: Vec<Arc<dyn QuoteSource>>,
        max_capacity: u64,
        ttl_secs: u64,
    ) -> Self {
        let memo = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            cache,
            sources,
            memo,
        }
    }

    /// Returns the rate converting one `from` into `to` on `date`.
    pub async fn get_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        date: NaiveDate,
    ) -> Result<Decimal, RateError> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        let key = RateKey::new(from, to, date);
        if let Some(rate) = self.memo.get(&key) {
            return Ok(rate);
        }

        if let Some(rate) = self.cache.get(from, to, date).await? {
            debug!(%from, %to, %date, "Exchange rate cache hit");
            self.memo.insert(key, rate);
            return Ok(rate);
        }

        let (fetched, published) = self
            .fetch_pair(from, to)
            .await
            .ok_or_else(|| RateError::Unavailable {
                from: from.clone(),
                to: to.clone(),
                date,
            })?;

        let rate_date = published.unwrap_or(date);
        if rate_date != date {
            warn!(
                %from, %to, requested = %date, published = %rate_date,
                "Source has no rate for the requested date, using its published rate"
            );
        }

        let stored = ExchangeRate::new(from.clone(), to.clone(), fetched, rate_date);
        let rate = match self.cache.insert(&stored).await? {
            CacheWrite::Inserted => fetched,
            CacheWrite::AlreadyPresent => {
                // Lost the race; serve what the winner stored.
                debug!(%from, %to, date = %rate_date, "Exchange rate already cached by a concurrent resolver");
                self.cache.get(from, to, rate_date).await?.unwrap_or(fetched)
            }
        };

        self.memo.insert(RateKey::new(from, to, rate_date), rate);
        self.memo.insert(key, rate);
        Ok(rate)
    }

    /// Converts `amount` from one currency into another at the rate for `date`.
    pub async fn convert(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
        date: NaiveDate,
    ) -> Result<Conversion, RateError> {
        let exchange_rate = self.get_rate(from, to, date).await?;

        Ok(Conversion {
            original_amount: amount,
            converted_amount: CurrencyService::convert(amount, exchange_rate),
            from_currency: from.clone(),
            to_currency: to.clone(),
            exchange_rate,
            date,
        })
    }

    /// Lists the currencies the first responsive source can quote.
    ///
    /// Never fails: falls back to a fixed list of common currencies.
    pub async fn list_supported_currencies(&self) -> Vec<CurrencyInfo> {
        for source in &self.sources {
            match source.fetch_currencies().await {
                Ok(currencies) if !currencies.is_empty() => return currencies,
                Ok(_) => warn!(source = source.name(), "Rate source listed no currencies"),
                Err(err) => warn!(source = source.name(), error = %err, "Currency listing failed"),
            }
        }

        warn!("Serving fallback currency list");
        fallback_currencies()
    }

    /// Refreshes every rate published for `base`, keyed on today's date.
    pub async fn bulk_refresh(&self, base: &CurrencyCode) -> Result<usize, RateError> {
        self.bulk_refresh_on(base, Utc::now().date_naive()).await
    }

    /// Refreshes every rate published for `base`, keyed on `date`.
    ///
    /// Overwrites same-day cached rates. Nothing is written unless a full
    /// table was fetched.
    pub async fn bulk_refresh_on(&self, base: &CurrencyCode, date: NaiveDate) -> Result<usize, RateError> {
        let table = self
            .fetch_table(base)
            .await
            .ok_or_else(|| RateError::TableUnavailable(base.clone()))?;

        let rates: Vec<ExchangeRate> = table
            .quotes()
            .map(|(target, rate)| ExchangeRate::new(base.clone(), target.clone(), rate, date))
            .collect();

        let written = self.cache.upsert_many(&rates).await?;
        for rate in &rates {
            self.memo.insert(
                RateKey::new(&rate.from_currency, &rate.to_currency, rate.rate_date),
                rate.rate,
            );
        }

        info!(%base, %date, written, "Exchange rates refreshed");
        Ok(written)
    }

    async fn fetch_table(&self, base: &CurrencyCode) -> Option<RateTable> {
        for source in &self.sources {
            match source.fetch_rates(base).await {
                Ok(table) => return Some(table),
                Err(err) => warn!(source = source.name(), %base, error = %err, "Rate source failed, trying next"),
            }
        }
        None
    }

    /// First usable quote for the pair, with the table's publication date.
    async fn fetch_pair(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Option<(Decimal, Option<NaiveDate>)> {
        for source in &self.sources {
            match source.fetch_rates(from).await {
                Ok(table) => match table.rate_for(to) {
                    Some(rate) => return Some((rate, table.date)),
                    None => warn!(source = source.name(), %from, %to, "Rate source has no usable quote"),
                },
                Err(err) => warn!(source = source.name(), %from, error = %err, "Rate source failed, trying next"),
            }
        }
        None
    }
}

fn fallback_currencies() -> Vec<CurrencyInfo> {
    FALLBACK_CURRENCIES
        .iter()
        .filter_map(|(code, name)| {
            CurrencyCode::parse(code)
                .ok()
                .map(|code| CurrencyInfo::new(code, *name))
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedSource;
    use super::*;
    use crate::memory::InMemoryStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn resolver_with(
        store: &Arc<InMemoryStore>,
        sources: Vec<Arc<ScriptedSource>>,
    ) -> ExchangeRateResolver {
        let sources = sources
            .into_iter()
            .map(|s| s as Arc<dyn QuoteSource>)
            .collect();
        ExchangeRateResolver::new(store.clone(), sources)
    }

    #[tokio::test]
    async fn test_same_currency_is_one_without_lookup() {
        let store = Arc::new(InMemoryStore::new());
        let source = Arc::new(ScriptedSource::failing("primary"));
        let resolver = resolver_with(&store, vec![source.clone()]);

        let rate = resolver.get_rate(&code("LKR"), &code("LKR"), day()).await.unwrap();

        assert_eq!(rate, Decimal::ONE);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_miss_fetches_and_persists() {
        let store = Arc::new(InMemoryStore::new());
        let primary = Arc::new(ScriptedSource::new("primary").quote("USD", "LKR", dec!(300)));
        let resolver = resolver_with(&store, vec![primary.clone()]);

        let rate = resolver.get_rate(&code("USD"), &code("LKR"), day()).await.unwrap();

        assert_eq!(rate, dec!(300));
        assert_eq!(
            RateCache::get(store.as_ref(), &code("USD"), &code("LKR"), day()).await.unwrap(),
            Some(dec!(300))
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_secondary_source() {
        let store = Arc::new(InMemoryStore::new());
        let primary = Arc::new(ScriptedSource::failing("primary"));
        let fallback = Arc::new(ScriptedSource::new("fallback").quote("USD", "EUR", dec!(0.92)));
        let resolver = resolver_with(&store, vec![primary.clone(), fallback.clone()]);

        let rate = resolver.get_rate(&code("USD"), &code("EUR"), day()).await.unwrap();

        assert_eq!(rate, dec!(0.92));
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_target_counts_as_failure() {
        let store = Arc::new(InMemoryStore::new());
        let primary = Arc::new(ScriptedSource::new("primary").quote("USD", "EUR", dec!(0.92)));
        let fallback = Arc::new(ScriptedSource::new("fallback").quote("USD", "LKR", dec!(301)));
        let resolver = resolver_with(&store, vec![primary, fallback]);

        let rate = resolver.get_rate(&code("USD"), &code("LKR"), day()).await.unwrap();

        assert_eq!(rate, dec!(301));
    }

    #[tokio::test]
    async fn test_all_sources_fail_is_unavailable() {
        let store = Arc::new(InMemoryStore::new());
        let resolver = resolver_with(
            &store,
            vec![
                Arc::new(ScriptedSource::failing("primary")),
                Arc::new(ScriptedSource::failing("fallback")),
            ],
        );

        let err = resolver.get_rate(&code("USD"), &code("LKR"), day()).await.unwrap_err();

        assert!(matches!(err, RateError::Unavailable { .. }));
        assert_eq!(store.rate_count().await, 0);
    }

    #[tokio::test]
    async fn test_get_rate_is_idempotent_without_refetch() {
        let store = Arc::new(InMemoryStore::new());
        let primary = Arc::new(ScriptedSource::new("primary").quote("USD", "LKR", dec!(300)));
        let resolver = resolver_with(&store, vec![primary.clone()]);

        let first = resolver.get_rate(&code("USD"), &code("LKR"), day()).await.unwrap();
        let second = resolver.get_rate(&code("USD"), &code("LKR"), day()).await.unwrap();

        // A fresh resolver over the same store hits the persistent cache.
        let cold = resolver_with(&store, vec![primary.clone()]);
        let third = cold.get_rate(&code("USD"), &code("LKR"), day()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetched_rate_is_filed_under_its_publication_date() {
        let store = Arc::new(InMemoryStore::new());
        let today = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let primary = Arc::new(
            ScriptedSource::new("primary")
                .quote("USD", "LKR", dec!(305))
                .published(today),
        );
        let resolver = resolver_with(&store, vec![primary.clone()]);

        let rate = resolver.get_rate(&code("USD"), &code("LKR"), day()).await.unwrap();
        assert_eq!(rate, dec!(305));

        let (usd, lkr) = (code("USD"), code("LKR"));
        let cached = |date| RateCache::get(store.as_ref(), &usd, &lkr, date);
        assert_eq!(cached(day()).await.unwrap(), None);
        assert_eq!(cached(today).await.unwrap(), Some(dec!(305)));

        // Both keys are served from memory afterwards.
        resolver.get_rate(&code("USD"), &code("LKR"), day()).await.unwrap();
        resolver.get_rate(&code("USD"), &code("LKR"), today).await.unwrap();
        assert_eq!(primary.calls(), 1);
    }

    /// A cache whose first read misses while another writer already stored a rate.
    struct RacingCache {
        stored: Decimal,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl RateCache for RacingCache {
        async fn get(
            &self,
            _from: &CurrencyCode,
            _to: &CurrencyCode,
            _date: NaiveDate,
        ) -> Result<Option<Decimal>, RateError> {
            let reads = self.reads.fetch_add(1, Ordering::SeqCst);
            Ok((reads > 0).then_some(self.stored))
        }

        async fn insert(&self, _rate: &ExchangeRate) -> Result<CacheWrite, RateError> {
            Ok(CacheWrite::AlreadyPresent)
        }

        async fn upsert_many(&self, rates: &[ExchangeRate]) -> Result<usize, RateError> {
            Ok(rates.len())
        }
    }

    #[tokio::test]
    async fn test_duplicate_cache_write_is_success() {
        let cache = Arc::new(RacingCache {
            stored: dec!(299.5),
            reads: AtomicUsize::new(0),
        });
        let primary: Arc<dyn QuoteSource> =
            Arc::new(ScriptedSource::new("primary").quote("USD", "LKR", dec!(300)));
        let resolver = ExchangeRateResolver::new(cache, vec![primary]);

        let rate = resolver.get_rate(&code("USD"), &code("LKR"), day()).await.unwrap();

        assert_eq!(rate, dec!(299.5));
    }

    #[tokio::test]
    async fn test_convert_rounds_converted_amount() {
        let store = Arc::new(InMemoryStore::new());
        let primary = Arc::new(ScriptedSource::new("primary").quote("EUR", "USD", dec!(1.08765)));
        let resolver = resolver_with(&store, vec![primary]);

        let conversion = resolver
            .convert(dec!(10), &code("EUR"), &code("USD"), day())
            .await
            .unwrap();

        assert_eq!(conversion.original_amount, dec!(10));
        assert_eq!(conversion.converted_amount, dec!(10.8765));
        assert_eq!(conversion.exchange_rate, dec!(1.08765));
        assert_eq!(conversion.from_currency, code("EUR"));
        assert_eq!(conversion.to_currency, code("USD"));
        assert_eq!(conversion.date, day());
    }

    #[tokio::test]
    async fn test_list_currencies_falls_back_to_static_list() {
        let store = Arc::new(InMemoryStore::new());
        let resolver = resolver_with(&store, vec![Arc::new(ScriptedSource::failing("primary"))]);

        let currencies = resolver.list_supported_currencies().await;

        assert_eq!(currencies.len(), 11);
        assert!(currencies.iter().any(|c| c.code.as_str() == "LKR"));
    }

    #[tokio::test]
    async fn test_list_currencies_from_source() {
        let store = Arc::new(InMemoryStore::new());
        let primary = Arc::new(ScriptedSource::new("primary").quote("USD", "LKR", dec!(300)));
        let resolver = resolver_with(&store, vec![primary]);

        let currencies = resolver.list_supported_currencies().await;

        assert_eq!(currencies.len(), 1);
        assert_eq!(currencies[0].code.as_str(), "USD");
    }

    #[tokio::test]
    async fn test_bulk_refresh_overwrites_and_serves_from_cache() {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert(&ExchangeRate::new(code("USD"), code("LKR"), dec!(290), day()))
            .await
            .unwrap();
        let primary = Arc::new(
            ScriptedSource::new("primary")
                .quote("USD", "USD", dec!(1))
                .quote("USD", "LKR", dec!(300))
                .quote("USD", "EUR", dec!(0.92))
                .quote("USD", "XAU", dec!(0)),
        );
        let resolver = resolver_with(&store, vec![primary.clone()]);

        let written = resolver.bulk_refresh_on(&code("USD"), day()).await.unwrap();
        let rate = resolver.get_rate(&code("USD"), &code("LKR"), day()).await.unwrap();

        assert_eq!(written, 2);
        assert_eq!(rate, dec!(300));
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test]
    async fn test_bulk_refresh_aborts_when_every_source_fails() {
        let store = Arc::new(InMemoryStore::new());
        let resolver = resolver_with(
            &store,
            vec![
                Arc::new(ScriptedSource::failing("primary")),
                Arc::new(ScriptedSource::failing("fallback")),
            ],
        );

        let err = resolver.bulk_refresh_on(&code("USD"), day()).await.unwrap_err();

        assert!(matches!(err, RateError::TableUnavailable(base) if base.as_str() == "USD"));
        assert_eq!(store.rate_count().await, 0);
    }
}
