//! Currency and exchange rate routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use ledgerly_core::currency::{Conversion, CurrencyInfo};
use ledgerly_shared::types::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ApiError, ApiResult, AppState};

/// Creates the currency routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/currencies", get(list_currencies))
        .route("/currencies/rate", get(get_rate))
        .route("/currencies/convert", get(convert))
        .route("/currencies/refresh", post(refresh))
}

/// Query for a rate lookup.
#[derive(Debug, Deserialize)]
pub struct RateQuery {
    /// Source currency code.
    pub from: String,
    /// Target currency code.
    pub to: String,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

/// Query for a conversion.
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    /// Amount in the source currency.
    pub amount: Decimal,
    /// Source currency code.
    pub from: String,
    /// Target currency code.
    pub to: String,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
}

/// Query for a bulk refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshQuery {
    /// Base currency whose table is refreshed.
    pub base: String,
}

/// Response for a rate lookup.
#[derive(Debug, Serialize)]
pub struct RateResponse {
    /// Source currency code.
    pub from: CurrencyCode,
    /// Target currency code.
    pub to: CurrencyCode,
    /// Day the rate applies to.
    pub date: NaiveDate,
    /// One `from` in `to`.
    pub rate: Decimal,
}

/// Response for a bulk refresh.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// Refreshed base.
    pub base: CurrencyCode,
    /// Rates written.
    pub count: usize,
}

fn parse_code(code: &str) -> Result<CurrencyCode, ApiError> {
    CurrencyCode::parse(code).map_err(|err| ApiError::validation(err.to_string()))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// GET `/currencies` - Currencies the rate sources can quote.
async fn list_currencies(State(state): State<AppState>) -> Json<Vec<CurrencyInfo>> {
    Json(state.resolver.list_supported_currencies().await)
}

/// GET `/currencies/rate?from&to&date`
async fn get_rate(
    State(state): State<AppState>,
    Query(query): Query<RateQuery>,
) -> ApiResult<Json<RateResponse>> {
    let from = parse_code(&query.from)?;
    let to = parse_code(&query.to)?;
    let date = query.date.unwrap_or_else(today);

    let rate = state.resolver.get_rate(&from, &to, date).await?;
    Ok(Json(RateResponse {
        from,
        to,
        date,
        rate,
    }))
}

/// GET `/currencies/convert?amount&from&to&date`
async fn convert(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> ApiResult<Json<Conversion>> {
    let from = parse_code(&query.from)?;
    let to = parse_code(&query.to)?;
    let date = query.date.unwrap_or_else(today);

    Ok(Json(state.resolver.convert(query.amount, &from, &to, date).await?))
}

/// POST `/currencies/refresh?base` - Overwrite today's rates for a base.
async fn refresh(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> ApiResult<Json<RefreshResponse>> {
    let base = parse_code(&query.base)?;
    let count = state.resolver.bulk_refresh(&base).await?;
    info!(%base, count, "Exchange rates refreshed via API");
    Ok(Json(RefreshResponse { base, count }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use ledgerly_core::memory::InMemoryStore;
    use rust_decimal_macros::dec;

    use crate::test_support::{StaticSource, decimal, router, send};

    fn source() -> StaticSource {
        StaticSource::default()
            .quote("USD", "LKR", dec!(300))
            .quote("USD", "EUR", dec!(0.92))
    }

    #[tokio::test]
    async fn test_rate_and_convert() {
        let store = Arc::new(InMemoryStore::new());
        let app = router(&store, source());

        let (status, body) = send(&app, "GET", "/api/v1/currencies/rate?from=usd&to=LKR&date=2026-03-01", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["from"], "USD");
        assert_eq!(decimal(&body["rate"]), dec!(300));

        let (status, body) = send(
            &app,
            "GET",
            "/api/v1/currencies/convert?amount=12.5&from=USD&to=LKR&date=2026-03-01",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal(&body["converted_amount"]), dec!(3750));
        assert_eq!(store.rate_count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_pair_and_bad_code() {
        let store = Arc::new(InMemoryStore::new());
        let app = router(&store, source());

        let (status, body) = send(&app, "GET", "/api/v1/currencies/rate?from=EUR&to=JPY&date=2026-03-01", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "RATE_UNAVAILABLE");

        let (status, body) = send(&app, "GET", "/api/v1/currencies/rate?from=US&to=LKR", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_refresh_and_listing() {
        let store = Arc::new(InMemoryStore::new());
        let app = router(&store, source());

        let (status, body) = send(&app, "POST", "/api/v1/currencies/refresh?base=USD", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(store.rate_count().await, 2);

        let (status, body) = send(&app, "GET", "/api/v1/currencies", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }
}
