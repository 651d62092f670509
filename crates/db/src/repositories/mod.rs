//! Repository layer for database operations.
//!
//! Repositories implement the core store traits against PostgreSQL and
//! expose the account and tag registry.

pub mod account;
pub mod exchange_rate;
mod mapping;
pub mod tag;
pub mod tag_balance;
pub mod transaction;

pub use account::{AccountRepository, BalanceVerification, CreateAccountInput};
pub use exchange_rate::ExchangeRateRepository;
pub use tag::{CreateTagInput, TagRepository};
pub use tag_balance::TagBalanceRepository;
pub use transaction::TransactionRepository;
