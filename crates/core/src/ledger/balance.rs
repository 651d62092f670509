//! Normal-balance convention.
//!
//! - Asset/Expense: DEBIT increases, CREDIT decreases (debit-normal)
//! - Liability/Income: CREDIT increases, DEBIT decreases (credit-normal)

use ledgerly_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{AccountType, EntryType, ProposedEntry, TransactionEntry};

/// Which side of an entry increases an account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalBalance {
    /// Debits increase the balance.
    DebitNormal,
    /// Credits increase the balance.
    CreditNormal,
}

impl NormalBalance {
    /// Calculates the balance change for an entry.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::DebitNormal => debit - credit,
            Self::CreditNormal => credit - debit,
        }
    }
}

impl AccountType {
    /// Returns the normal balance side for this account type.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::DebitNormal,
            Self::Liability | Self::Income => NormalBalance::CreditNormal,
        }
    }
}

/// Signed delta a proposed entry applies to its account.
#[must_use]
pub fn balance_delta(account_type: AccountType, entry: &ProposedEntry) -> Decimal {
    account_type
        .normal_balance()
        .balance_change(entry.debit_amount, entry.credit_amount)
}

/// Net movement produced by committed entries on one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerMovement {
    /// The account ID.
    pub account_id: AccountId,
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
    /// Net change under the account type's convention.
    pub net_change: Decimal,
}

/// Replays committed entries for one account.
///
/// Entries for other accounts are ignored.
#[must_use]
pub fn replay_entries<'a>(
    account_id: AccountId,
    account_type: AccountType,
    entries: impl IntoIterator<Item = &'a TransactionEntry>,
) -> LedgerMovement {
    let (debit_total, credit_total) = entries
        .into_iter()
        .filter(|entry| entry.account_id == account_id)
        .fold((Decimal::ZERO, Decimal::ZERO), |(debit, credit), entry| {
            match entry.entry_type {
                EntryType::Debit => (debit + entry.debit_amount, credit),
                EntryType::Credit => (debit, credit + entry.credit_amount),
            }
        });

    LedgerMovement {
        account_id,
        debit_total,
        credit_total,
        net_change: account_type
            .normal_balance()
            .balance_change(debit_total, credit_total),
    }
}
