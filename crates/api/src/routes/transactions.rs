//! Transaction routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use ledgerly_core::ledger::{PostedTransaction, TransactionRequest};
use ledgerly_shared::types::TransactionId;
use tracing::info;

use crate::{ApiError, ApiResult, AppState};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction))
        .route("/transactions/{id}", get(get_transaction))
}

/// POST `/transactions` - Compose, validate and post any request variant.
async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<TransactionRequest>,
) -> ApiResult<(StatusCode, Json<PostedTransaction>)> {
    let posted = state.composer.create(request).await?;
    info!(transaction_id = %posted.transaction.id, "Transaction created via API");
    Ok((StatusCode::CREATED, Json(posted)))
}

/// GET `/transactions/{id}` - Read a committed transaction with its entries.
async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<TransactionId>,
) -> ApiResult<Json<PostedTransaction>> {
    state
        .composer
        .get_transaction(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("transaction {id}")))
}
