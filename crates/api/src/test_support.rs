//! Router fixtures over the in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use ledgerly_core::currency::{CurrencyInfo, ExchangeRateResolver, QuoteSource, RateError, RateTable};
use ledgerly_core::ledger::TransactionComposer;
use ledgerly_core::memory::InMemoryStore;
use ledgerly_core::tags::TagBalanceAllocator;
use ledgerly_shared::types::CurrencyCode;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use crate::{AppState, create_router};

/// Source answering from fixed tables.
#[derive(Default)]
pub struct StaticSource {
    tables: HashMap<CurrencyCode, RateTable>,
}

impl StaticSource {
    pub fn quote(mut self, from: &str, to: &str, rate: Decimal) -> Self {
        let from = CurrencyCode::parse(from).unwrap();
        self.tables
            .entry(from.clone())
            .or_insert_with(|| RateTable::new(from))
            .rates
            .insert(CurrencyCode::parse(to).unwrap(), rate);
        self
    }
}

#[async_trait]
impl QuoteSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<RateTable, RateError> {
        self.tables
            .get(base)
            .cloned()
            .ok_or_else(|| RateError::source_failed("static", format!("no table for {base}")))
    }

    async fn fetch_currencies(&self) -> Result<Vec<CurrencyInfo>, RateError> {
        Ok(self
            .tables
            .keys()
            .map(|code| CurrencyInfo::new(code.clone(), code.as_str()))
            .collect())
    }
}

/// Router wired like the server, over one in-memory store.
pub fn router(store: &Arc<InMemoryStore>, source: StaticSource) -> Router {
    let sources: Vec<Arc<dyn QuoteSource>> = vec![Arc::new(source)];
    let resolver = Arc::new(ExchangeRateResolver::new(store.clone(), sources));
    let allocator = TagBalanceAllocator::new(store.clone());
    let composer = TransactionComposer::new(store.clone(), resolver.clone(), allocator.clone());

    create_router(AppState {
        composer: Arc::new(composer),
        allocator,
        resolver,
    })
}

/// Sends one request and decodes the JSON body (`Null` when empty).
pub async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(body.map_or_else(Body::empty, |json| Body::from(json.to_string())))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Reads a decimal rendered as a JSON string.
pub fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}
