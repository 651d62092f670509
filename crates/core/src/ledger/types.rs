//! Ledger domain types.
//!
//! Accounts, proposed entries handed to the validator and executor, and the
//! committed transaction shape the executor hands back.

use chrono::{DateTime, NaiveDate, Utc};
use ledgerly_shared::types::{AccountId, CurrencyCode, EntryId, TagId, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tags::{AllocationResult, TagOperation};

/// Account classification driving the normal-balance convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Something owned (cash, bank).
    Asset,
    /// Something owed (credit card, loan).
    Liability,
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

/// Entry type: either Debit or Credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    /// Debit entry.
    Debit,
    /// Credit entry.
    Credit,
}

/// Transaction type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
    /// Money moving between two accounts.
    Transfer,
}

/// A ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Current balance. Only the executor changes it.
    pub balance: Decimal,
    /// Currency every entry on this account is denominated in.
    pub currency: CurrencyCode,
    /// Optional free-text description.
    pub description: Option<String>,
}

impl Account {
    /// Creates a new account with an opening balance.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        account_type: AccountType,
        currency: CurrencyCode,
        balance: Decimal,
    ) -> Self {
        Self {
            id: AccountId::new(),
            name: name.into(),
            account_type,
            balance,
            currency,
            description: None,
        }
    }
}

/// Cross-currency annotation on an entry leg.
///
/// `exchange_rate` converts one unit of `original_currency` into the entry
/// account's currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossCurrency {
    /// Amount in the original currency.
    pub original_amount: Decimal,
    /// The original currency.
    pub original_currency: CurrencyCode,
    /// Rate from the original currency into the account currency.
    pub exchange_rate: Decimal,
}

/// An entry that has not been committed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedEntry {
    /// Account the entry posts to.
    pub account_id: AccountId,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Debit amount (zero for credits).
    pub debit_amount: Decimal,
    /// Credit amount (zero for debits).
    pub credit_amount: Decimal,
    /// Present on legs of a cross-currency transfer.
    pub cross_currency: Option<CrossCurrency>,
}

impl ProposedEntry {
    /// A debit leg.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            entry_type: EntryType::Debit,
            debit_amount: amount,
            credit_amount: Decimal::ZERO,
            cross_currency: None,
        }
    }

    /// A credit leg.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            entry_type: EntryType::Credit,
            debit_amount: Decimal::ZERO,
            credit_amount: amount,
            cross_currency: None,
        }
    }

    /// Attaches a cross-currency annotation.
    #[must_use]
    pub fn with_cross_currency(mut self, cross: CrossCurrency) -> Self {
        self.cross_currency = Some(cross);
        self
    }

    /// The entry's nonzero amount.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        match self.entry_type {
            EntryType::Debit => self.debit_amount,
            EntryType::Credit => self.credit_amount,
        }
    }
}

/// Header of a transaction about to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionHeader {
    /// Free-text description.
    pub description: String,
    /// Requested amount, informational only.
    pub amount: Decimal,
    /// Transaction date.
    pub date: NaiveDate,
    /// Income, expense or transfer.
    pub transaction_type: TransactionType,
    /// Tag for tagged variants.
    pub tag_id: Option<TagId>,
}

/// Everything the executor needs for one atomic posting.
#[derive(Debug, Clone)]
pub struct PostingRequest {
    /// Transaction header.
    pub header: TransactionHeader,
    /// Validated entry set.
    pub entries: Vec<ProposedEntry>,
    /// Tag operation applied inside the same atomic scope, if any.
    pub allocation: Option<TagOperation>,
}

/// A committed transaction header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Free-text description.
    pub description: String,
    /// Requested amount, informational only.
    pub amount: Decimal,
    /// Transaction date.
    pub date: NaiveDate,
    /// Income, expense or transfer.
    pub transaction_type: TransactionType,
    /// Tag for tagged variants.
    pub tag_id: Option<TagId>,
    /// Commit timestamp.
    pub created_at: DateTime<Utc>,
}

/// A committed entry. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEntry {
    /// Entry ID.
    pub id: EntryId,
    /// Owning transaction.
    pub transaction_id: TransactionId,
    /// Account posted to.
    pub account_id: AccountId,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Debit amount (zero for credits).
    pub debit_amount: Decimal,
    /// Credit amount (zero for debits).
    pub credit_amount: Decimal,
    /// Amount in the original currency, for cross-currency legs.
    pub original_amount: Option<Decimal>,
    /// Original currency, for cross-currency legs.
    pub original_currency: Option<CurrencyCode>,
    /// Rate from the original currency into the account currency.
    pub exchange_rate: Option<Decimal>,
    /// Commit timestamp.
    pub created_at: DateTime<Utc>,
}

impl TransactionEntry {
    /// Builds the committed form of a proposed entry.
    #[must_use]
    pub fn from_proposed(
        transaction_id: TransactionId,
        entry: &ProposedEntry,
        created_at: DateTime<Utc>,
    ) -> Self {
        let cross = entry.cross_currency.as_ref();
        Self {
            id: EntryId::new(),
            transaction_id,
            account_id: entry.account_id,
            entry_type: entry.entry_type,
            debit_amount: entry.debit_amount,
            credit_amount: entry.credit_amount,
            original_amount: cross.map(|c| c.original_amount),
            original_currency: cross.map(|c| c.original_currency.clone()),
            exchange_rate: cross.map(|c| c.exchange_rate),
            created_at,
        }
    }
}

/// Result of a posting: header, entries and the tag outcome when one ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedTransaction {
    /// Committed header.
    pub transaction: Transaction,
    /// Committed entries, in posting order.
    pub entries: Vec<TransactionEntry>,
    /// Outcome of the tag operation for tagged variants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<AllocationResult>,
}

impl PostedTransaction {
    /// Builds the committed form of a posting request.
    #[must_use]
    pub fn from_request(request: &PostingRequest, created_at: DateTime<Utc>) -> Self {
        let transaction = Transaction {
            id: TransactionId::new(),
            description: request.header.description.clone(),
            amount: request.header.amount,
            date: request.header.date,
            transaction_type: request.header.transaction_type,
            tag_id: request.header.tag_id,
            created_at,
        };
        let entries = request
            .entries
            .iter()
            .map(|entry| TransactionEntry::from_proposed(transaction.id, entry, created_at))
            .collect();
        Self {
            transaction,
            entries,
            allocation: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_proposed_entry_amount() {
        let account = AccountId::new();
        assert_eq!(ProposedEntry::debit(account, dec!(10)).amount(), dec!(10));
        let credit = ProposedEntry::credit(account, dec!(7.5));
        assert_eq!(credit.amount(), dec!(7.5));
        assert_eq!(credit.debit_amount, Decimal::ZERO);
    }

    #[test]
    fn test_committed_entry_carries_cross_currency() {
        let cross = CrossCurrency {
            original_amount: dec!(1000),
            original_currency: CurrencyCode::parse("USD").unwrap(),
            exchange_rate: dec!(300),
        };
        let entry = ProposedEntry::debit(AccountId::new(), dec!(300000)).with_cross_currency(cross);
        let committed = TransactionEntry::from_proposed(TransactionId::new(), &entry, Utc::now());

        assert_eq!(committed.original_amount, Some(dec!(1000)));
        assert_eq!(committed.original_currency.unwrap().as_str(), "USD");
        assert_eq!(committed.exchange_rate, Some(dec!(300)));
    }

    #[test]
    fn test_enum_wire_format() {
        assert_eq!(serde_json::to_string(&AccountType::Liability).unwrap(), "\"LIABILITY\"");
        assert_eq!(serde_json::to_string(&EntryType::Debit).unwrap(), "\"DEBIT\"");
        assert_eq!(serde_json::to_string(&TransactionType::Transfer).unwrap(), "\"TRANSFER\"");
    }
}
