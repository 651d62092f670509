//! `SeaORM` entities for the ledger schema.

#![allow(missing_docs)]

pub mod accounts;
pub mod exchange_rates;
pub mod sea_orm_active_enums;
pub mod tag_balances;
pub mod tags;
pub mod transaction_entries;
pub mod transactions;

pub mod prelude {
    pub use super::accounts::Entity as Accounts;
    pub use super::exchange_rates::Entity as ExchangeRates;
    pub use super::tag_balances::Entity as TagBalances;
    pub use super::tags::Entity as Tags;
    pub use super::transaction_entries::Entity as TransactionEntries;
    pub use super::transactions::Entity as Transactions;
}
