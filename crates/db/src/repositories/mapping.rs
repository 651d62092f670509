//! Row ↔ domain conversions shared by the repositories.

use chrono::Utc;
use ledgerly_core::currency::RateError;
use ledgerly_core::ledger::{Account, LedgerError, Transaction, TransactionEntry};
use ledgerly_core::tags::{Tag, TagBalance};
use ledgerly_shared::types::{
    AccountId, CurrencyCode, EntryId, TagBalanceId, TagId, TransactionId,
};
use sea_orm::DbErr;

use crate::entities::{accounts, tag_balances, tags, transaction_entries, transactions};

pub(crate) fn store_err(err: DbErr) -> LedgerError {
    LedgerError::Store(err.to_string())
}

pub(crate) fn cache_err(err: DbErr) -> RateError {
    RateError::Cache(err.to_string())
}

/// Stored codes are CHAR(3); anything else is a corrupted row.
pub(crate) fn currency(code: &str) -> Result<CurrencyCode, LedgerError> {
    CurrencyCode::parse(code).map_err(|err| LedgerError::Store(err.to_string()))
}

pub(crate) fn account_from_model(model: accounts::Model) -> Result<Account, LedgerError> {
    Ok(Account {
        id: AccountId::from_uuid(model.id),
        currency: currency(&model.currency)?,
        name: model.name,
        account_type: model.account_type.into(),
        balance: model.balance,
        description: model.description,
    })
}

pub(crate) fn tag_from_model(model: tags::Model) -> Tag {
    Tag {
        id: TagId::from_uuid(model.id),
        name: model.name,
        description: model.description,
        color: model.color,
    }
}

pub(crate) fn tag_balance_from_model(model: tag_balances::Model) -> Result<TagBalance, LedgerError> {
    Ok(TagBalance {
        id: TagBalanceId::from_uuid(model.id),
        tag_id: TagId::from_uuid(model.tag_id),
        account_id: AccountId::from_uuid(model.account_id),
        currency: currency(&model.currency)?,
        balance: model.balance,
    })
}

pub(crate) fn transaction_from_model(model: transactions::Model) -> Transaction {
    Transaction {
        id: TransactionId::from_uuid(model.id),
        description: model.description,
        amount: model.amount,
        date: model.transaction_date,
        transaction_type: model.transaction_type.into(),
        tag_id: model.tag_id.map(TagId::from_uuid),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn entry_from_model(
    model: transaction_entries::Model,
) -> Result<TransactionEntry, LedgerError> {
    Ok(TransactionEntry {
        id: EntryId::from_uuid(model.id),
        transaction_id: TransactionId::from_uuid(model.transaction_id),
        account_id: AccountId::from_uuid(model.account_id),
        entry_type: model.entry_type.into(),
        debit_amount: model.debit_amount,
        credit_amount: model.credit_amount,
        original_amount: model.original_amount,
        original_currency: model
            .original_currency
            .as_deref()
            .map(currency)
            .transpose()?,
        exchange_rate: model.exchange_rate,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
