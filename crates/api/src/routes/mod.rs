//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod currencies;
pub mod health;
pub mod tags;
pub mod transactions;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(transactions::routes())
        .merge(tags::routes())
        .merge(currencies::routes())
}
