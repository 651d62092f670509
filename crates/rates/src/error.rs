//! Errors raised while talking to a currency feed.

use thiserror::Error;

/// Errors from one HTTP currency feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The request could not be built or sent, or timed out.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed answered with a non-success status.
    #[error("Feed returned status {status} for {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The body was not the expected document shape.
    #[error("Invalid feed document: {0}")]
    InvalidData(String),
}
