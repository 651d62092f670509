//! Edge errors that are not ledger failures.
//!
//! Ledger, tag and rate failures carry their own taxonomy in `ledgerly-core`.
//! This type covers what happens around them: unparseable request input,
//! lookups that miss, and configuration that cannot be loaded.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Errors raised outside the ledger core.
#[derive(Debug, Error)]
pub enum AppError {
    /// A looked-up resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request input could not be parsed (bad currency code, malformed id).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Config(_) => 500,
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}
