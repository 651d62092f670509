//! HTTP exchange rate sources for Ledgerly.
//!
//! Implements the core `QuoteSource` trait against the public currency-api
//! feeds. Two mirrors with the same document shape are configured; the
//! resolver tries them in order.

pub mod error;
pub mod parse;
pub mod source;

use std::sync::Arc;
use std::time::Duration;

use ledgerly_core::currency::QuoteSource;
use ledgerly_shared::RatesConfig;

pub use error::FeedError;
pub use source::HttpQuoteSource;

/// Builds the ordered source list (primary, then fallback) from configuration.
///
/// Both sources share one HTTP client.
pub fn sources_from_config(config: &RatesConfig) -> Result<Vec<Arc<dyn QuoteSource>>, FeedError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let primary: Arc<dyn QuoteSource> = Arc::new(HttpQuoteSource::with_client(
        "primary",
        &config.primary_url,
        client.clone(),
    ));
    let fallback: Arc<dyn QuoteSource> =
        Arc::new(HttpQuoteSource::with_client("fallback", &config.fallback_url, client));

    Ok(vec![primary, fallback])
}
