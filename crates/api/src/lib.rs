//! HTTP API layer with Axum routes.
//!
//! A thin adapter over the core engine: handlers parse the request, call the
//! composer, allocator or resolver, and render the result or the error.

pub mod error;
pub mod routes;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::Router;
use ledgerly_core::currency::ExchangeRateResolver;
use ledgerly_core::ledger::TransactionComposer;
use ledgerly_core::tags::TagBalanceAllocator;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Posts and reads back transactions.
    pub composer: Arc<TransactionComposer>,
    /// Direct tag balance operations.
    pub allocator: TagBalanceAllocator,
    /// Rate lookups, conversions and refreshes.
    pub resolver: Arc<ExchangeRateResolver>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
