//! Property-based tests for entry validation.
//!
//! - Mirrored debit/credit sets in one currency always balance
//! - A gap larger than the tolerance never balances
//! - Entries with both or neither amount set are always rejected
//! - Composed entry sets always carry exactly one nonzero amount per entry

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use ledgerly_shared::types::{AccountId, CurrencyCode};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::composer::{CrossTransfer, cross_currency_transfer_entries, expense_entries, income_entries};
use super::error::LedgerError;
use super::types::{Account, AccountType, ProposedEntry};
use super::validation::{BALANCE_TOLERANCE, BalanceCheck, DoubleEntryValidator, check_structure};
use crate::currency::{CurrencyService, ExchangeRateResolver};
use crate::memory::InMemoryStore;

/// Strategy to generate a valid positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate exchange rates (0.0100 to 1000.0000).
fn rate() -> impl Strategy<Value = Decimal> {
    (100i64..10_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn lkr_account() -> Account {
    Account::new("Account", AccountType::Asset, CurrencyCode::parse("LKR").unwrap(), Decimal::ZERO)
}

/// Runs the validator on a single-currency entry set built from amounts.
fn check_split(debits: &[Decimal], credits: &[Decimal]) -> Result<BalanceCheck, LedgerError> {
    let mut accounts = HashMap::new();
    let mut entries = Vec::new();
    for (amounts, debit) in [(debits, true), (credits, false)] {
        for amount in amounts {
            let account = lkr_account();
            entries.push(if debit {
                ProposedEntry::debit(account.id, *amount)
            } else {
                ProposedEntry::credit(account.id, *amount)
            });
            accounts.insert(account.id, account);
        }
    }

    let resolver = ExchangeRateResolver::new(Arc::new(InMemoryStore::new()), Vec::new());
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(async {
            DoubleEntryValidator::new(&resolver)
                .check(&entries, &accounts, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
                .await
        })
}

fn has_single_amount(entry: &ProposedEntry) -> bool {
    entry.debit_amount.is_zero() != entry.credit_amount.is_zero()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Debits split any way balance against their sum on the credit side.
    #[test]
    fn prop_mirrored_entries_balance(
        debits in prop::collection::vec(positive_amount(), 1..6),
    ) {
        let total: Decimal = debits.iter().copied().sum();
        let check = check_split(&debits, &[total]).unwrap();
        prop_assert!(check.is_balanced);
        prop_assert_eq!(check.total_debit, check.total_credit);
    }

    /// A gap above the tolerance is always reported as unbalanced.
    #[test]
    fn prop_gap_above_tolerance_unbalances(
        amount in positive_amount(),
        gap_cents in 2i64..10_000i64,
    ) {
        let gap = Decimal::new(gap_cents, 2);
        prop_assume!(gap > BALANCE_TOLERANCE);
        let check = check_split(&[amount + gap], &[amount]).unwrap();
        prop_assert!(!check.is_balanced);
    }

    /// An entry with both sides set is rejected before any valuation.
    #[test]
    fn prop_double_sided_entry_rejected(amount in positive_amount()) {
        let account = AccountId::new();
        let mut both = ProposedEntry::debit(account, amount);
        both.credit_amount = amount;
        let result = check_structure(&[both, ProposedEntry::credit(AccountId::new(), amount)]);
        prop_assert!(matches!(result, Err(LedgerError::InvalidEntry(_))));
    }

    /// Every composed entry carries exactly one nonzero amount.
    #[test]
    fn prop_composed_entries_single_sided(amount in positive_amount(), rate in rate()) {
        let (a, b) = (AccountId::new(), AccountId::new());
        let cross = cross_currency_transfer_entries(&CrossTransfer {
            from: a,
            to: b,
            amount,
            converted_amount: CurrencyService::convert(amount, rate),
            source_currency: CurrencyCode::parse("USD").unwrap(),
            destination_currency: CurrencyCode::parse("LKR").unwrap(),
            rate,
        })
        .unwrap();

        for entry in income_entries(a, b, amount)
            .iter()
            .chain(&expense_entries(a, b, amount))
            .chain(&cross)
        {
            prop_assert!(has_single_amount(entry));
        }
    }
}
