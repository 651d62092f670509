//! Double-entry bookkeeping.
//!
//! - Domain types and the normal-balance convention
//! - Double-entry validation across currencies
//! - The transaction composer and the executor contract it drives
//! - Error types for ledger operations

pub mod balance;
pub mod composer;
pub mod error;
pub mod requests;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use balance::{LedgerMovement, NormalBalance, balance_delta, replay_entries};
pub use composer::TransactionComposer;
pub use error::LedgerError;
pub use requests::{ExpenseRequest, IncomeRequest, Tagged, TransactionRequest, TransferRequest};
pub use store::LedgerStore;
pub use types::{
    Account, AccountType, CrossCurrency, EntryType, PostedTransaction, PostingRequest,
    ProposedEntry, Transaction, TransactionEntry, TransactionHeader, TransactionType,
};
pub use validation::{BALANCE_TOLERANCE, BalanceCheck, DoubleEntryValidator};
