//! Common types used across the application.

pub mod id;
pub mod currency;

pub use id::*;
pub use currency::{CurrencyCode, InvalidCurrencyCode};
