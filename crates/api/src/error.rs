//! Error rendering at the HTTP edge.
//!
//! Every failure becomes `{"error": CODE, "message": text}` with the status
//! taken from the error's own taxonomy.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ledgerly_core::currency::RateError;
use ledgerly_core::ledger::LedgerError;
use ledgerly_shared::AppError;
use serde_json::json;
use tracing::error;

/// Errors a handler can return.
#[derive(Debug)]
pub enum ApiError {
    /// Raised by the ledger, the tag allocator or the resolver.
    Ledger(LedgerError),
    /// Raised at the edge itself (bad query, missing resource).
    App(AppError),
}

impl ApiError {
    /// A malformed request parameter.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::App(AppError::Validation(message.into()))
    }

    /// A resource that does not exist.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::App(AppError::NotFound(message.into()))
    }

    fn parts(&self) -> (u16, &'static str, String) {
        match self {
            Self::Ledger(err) => (err.http_status_code(), err.error_code(), err.to_string()),
            Self::App(err) => (err.status_code(), err.error_code(), err.to_string()),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<RateError> for ApiError {
    fn from(err: RateError) -> Self {
        Self::Ledger(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error_code = code, error = %message, "Request failed");
        }

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerly_shared::types::AccountId;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(ApiError::from(LedgerError::AccountNotFound(AccountId::new())), 404, "ACCOUNT_NOT_FOUND")]
    #[case(ApiError::from(LedgerError::InvalidAmount(dec!(0))), 400, "INVALID_AMOUNT")]
    #[case(
        ApiError::from(LedgerError::ExceedsAccountBalance { requested: dec!(2), available: dec!(1) }),
        422,
        "EXCEEDS_ACCOUNT_BALANCE"
    )]
    #[case(ApiError::from(RateError::Cache("down".into())), 500, "STORE_FAILURE")]
    #[case(ApiError::validation("bad code"), 400, "VALIDATION_ERROR")]
    #[case(ApiError::not_found("missing"), 404, "NOT_FOUND")]
    fn test_error_parts(#[case] err: ApiError, #[case] status: u16, #[case] code: &str) {
        let (actual_status, actual_code, _) = err.parts();
        assert_eq!(actual_status, status);
        assert_eq!(actual_code, code);
    }
}
