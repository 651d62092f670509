//! HTTP quote source.

use std::time::Duration;

use async_trait::async_trait;
use ledgerly_core::currency::{CurrencyInfo, QuoteSource, RateError, RateTable};
use ledgerly_shared::types::CurrencyCode;
use serde_json::Value;
use tracing::debug;

use crate::error::FeedError;
use crate::parse::{parse_currency_list, parse_rate_table};

/// A currency feed reachable over HTTP.
///
/// Reads `{base_url}/currencies/{base}.json` and `{base_url}/currencies.json`.
#[derive(Clone)]
pub struct HttpQuoteSource {
    name: String,
    base_url: String,
    client: reqwest::Client,
}

impl HttpQuoteSource {
    /// Creates a source with a per-request timeout.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(name, base_url, client))
    }

    /// Creates a source sharing an existing client.
    #[must_use]
    pub fn with_client(
        name: impl Into<String>,
        base_url: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            name: name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// URL of the rate document for `base`.
    #[must_use]
    pub fn rates_url(&self, base: &CurrencyCode) -> String {
        format!("{}/currencies/{}.json", self.base_url, base.to_lowercase())
    }

    /// URL of the currency listing.
    #[must_use]
    pub fn currencies_url(&self) -> String {
        format!("{}/currencies.json", self.base_url)
    }

    async fn get_json(&self, url: &str) -> Result<Value, FeedError> {
        debug!(source = %self.name, %url, "Fetching currency feed");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<RateTable, RateError> {
        let body = self
            .get_json(&self.rates_url(base))
            .await
            .map_err(|err| RateError::source_failed(&self.name, err))?;
        parse_rate_table(base, &body).map_err(|err| RateError::source_failed(&self.name, err))
    }

    async fn fetch_currencies(&self) -> Result<Vec<CurrencyInfo>, RateError> {
        let body = self
            .get_json(&self.currencies_url())
            .await
            .map_err(|err| RateError::source_failed(&self.name, err))?;
        parse_currency_list(&body).map_err(|err| RateError::source_failed(&self.name, err))
    }
}
