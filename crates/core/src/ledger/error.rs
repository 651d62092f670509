//! Ledger error types.
//!
//! Every variant aborts the in-progress atomic scope. None are retried inside
//! the core; callers decide what to do with them.

use ledgerly_shared::types::{AccountId, CurrencyCode, TagId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::currency::RateError;

/// Errors that can occur during ledger, allocation and valuation operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Not Found ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Tag not found.
    #[error("Tag not found: {0}")]
    TagNotFound(TagId),

    /// No tag balance row exists for the tag/account pair.
    #[error("No balance for tag {tag_id} on account {account_id}")]
    TagBalanceNotFound {
        /// The tag.
        tag_id: TagId,
        /// The account.
        account_id: AccountId,
    },

    // ========== Validation Errors ==========
    /// Valuated debits and credits differ by more than the tolerance.
    #[error("Transaction is not balanced in {currency}. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Valuated debit total.
        debit: Decimal,
        /// Valuated credit total.
        credit: Decimal,
        /// Valuation currency of both totals.
        currency: CurrencyCode,
    },

    /// Amount must be strictly positive with at most four decimal places.
    #[error("Amount must be positive with at most 4 decimal places, got {0}")]
    InvalidAmount(Decimal),

    /// Structurally invalid entry set.
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    // ========== Business Rules ==========
    /// Tag assignment would exceed the backing account balance.
    #[error("Tag balance {requested} would exceed account balance {available}")]
    ExceedsAccountBalance {
        /// Prospective tag balance after the assignment.
        requested: Decimal,
        /// Current account balance.
        available: Decimal,
    },

    /// Removal is larger than the current tag balance.
    #[error("Cannot remove {requested} from tag balance {available}")]
    InsufficientTagBalance {
        /// Amount asked to remove.
        requested: Decimal,
        /// Current tag balance.
        available: Decimal,
    },

    // ========== External ==========
    /// No rate could be resolved from the cache or any source.
    #[error("Exchange rate unavailable: {0}")]
    RateUnavailable(String),

    /// Opaque failure from the backing store.
    #[error("Store failure: {0}")]
    Store(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::TagNotFound(_) => "TAG_NOT_FOUND",
            Self::TagBalanceNotFound { .. } => "TAG_BALANCE_NOT_FOUND",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidEntry(_) => "INVALID_ENTRY",
            Self::ExceedsAccountBalance { .. } => "EXCEEDS_ACCOUNT_BALANCE",
            Self::InsufficientTagBalance { .. } => "INSUFFICIENT_TAG_BALANCE",
            Self::RateUnavailable(_) => "RATE_UNAVAILABLE",
            Self::Store(_) => "STORE_FAILURE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::UnbalancedEntry { .. } | Self::InvalidAmount(_) | Self::InvalidEntry(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::TagNotFound(_) | Self::TagBalanceNotFound { .. } => 404,

            // 422 Unprocessable - business rule violations
            Self::ExceedsAccountBalance { .. } | Self::InsufficientTagBalance { .. } => 422,

            // 503 Service Unavailable - upstream rate sources
            Self::RateUnavailable(_) => 503,

            // 500 Internal Server Error
            Self::Store(_) => 500,
        }
    }
}

impl From<RateError> for LedgerError {
    fn from(err: RateError) -> Self {
        match err {
            RateError::Cache(msg) => Self::Store(msg),
            other => Self::RateUnavailable(other.to_string()),
        }
    }
}
