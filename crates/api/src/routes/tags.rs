//! Tag balance routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use ledgerly_core::ledger::LedgerError;
use ledgerly_core::tags::{AllocationResult, TagBalance, TagBalanceValidation};
use ledgerly_shared::types::{AccountId, TagId};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{ApiResult, AppState};

/// Creates the tag balance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/{account_id}/tag-balances", get(list_tag_balances))
        .route("/tags/{tag_id}/accounts/{account_id}/balance", get(get_tag_balance))
        .route("/tags/{tag_id}/accounts/{account_id}/assign", post(assign))
        .route("/tags/{tag_id}/accounts/{account_id}/remove", post(remove))
        .route("/tags/{tag_id}/accounts/{account_id}/validate", get(validate))
}

/// Request body for assign and remove.
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    /// Amount in the account's currency.
    pub amount: Decimal,
}

async fn list_tag_balances(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> ApiResult<Json<Vec<TagBalance>>> {
    Ok(Json(state.allocator.list_for_account(account_id).await?))
}

async fn get_tag_balance(
    State(state): State<AppState>,
    Path((tag_id, account_id)): Path<(TagId, AccountId)>,
) -> ApiResult<Json<TagBalance>> {
    let balance = state
        .allocator
        .get(tag_id, account_id)
        .await?
        .ok_or(LedgerError::TagBalanceNotFound { tag_id, account_id })?;
    Ok(Json(balance))
}

async fn assign(
    State(state): State<AppState>,
    Path((tag_id, account_id)): Path<(TagId, AccountId)>,
    Json(body): Json<AmountRequest>,
) -> ApiResult<Json<TagBalance>> {
    Ok(Json(state.allocator.assign(tag_id, account_id, body.amount).await?))
}

async fn remove(
    State(state): State<AppState>,
    Path((tag_id, account_id)): Path<(TagId, AccountId)>,
    Json(body): Json<AmountRequest>,
) -> ApiResult<Json<AllocationResult>> {
    Ok(Json(state.allocator.remove(tag_id, account_id, body.amount).await?))
}

async fn validate(
    State(state): State<AppState>,
    Path((tag_id, account_id)): Path<(TagId, AccountId)>,
) -> ApiResult<Json<TagBalanceValidation>> {
    Ok(Json(state.allocator.validate(tag_id, account_id).await?))
}
