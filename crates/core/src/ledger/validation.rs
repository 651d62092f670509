//! Double-entry validation.
//!
//! Structural rules first, then the balancing rule. Single-currency entry
//! sets compare raw totals. Mixed sets are valuated in the currency of the
//! first entry's account.

use std::collections::HashMap;

use chrono::NaiveDate;
use ledgerly_shared::types::{AccountId, CurrencyCode};
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::LedgerError;
use super::types::{Account, EntryType, ProposedEntry};
use crate::currency::{CurrencyService, ExchangeRateResolver};

/// Largest debit/credit difference still treated as balanced (one minor unit).
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Outcome of the balancing rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceCheck {
    /// Currency both totals are expressed in.
    pub valuation_currency: CurrencyCode,
    /// Valuated debit total.
    pub total_debit: Decimal,
    /// Valuated credit total.
    pub total_credit: Decimal,
    /// True when the totals differ by at most [`BALANCE_TOLERANCE`].
    pub is_balanced: bool,
}

impl BalanceCheck {
    /// Debit total minus credit total.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }
}

/// Rejects entry sets that cannot be posted regardless of amounts.
pub fn check_structure(entries: &[ProposedEntry]) -> Result<(), LedgerError> {
    if entries.len() < 2 {
        return Err(LedgerError::InvalidEntry(format!(
            "a transaction needs at least 2 entries, got {}",
            entries.len()
        )));
    }

    for entry in entries {
        if entry.debit_amount.is_sign_negative() || entry.credit_amount.is_sign_negative() {
            return Err(LedgerError::InvalidEntry(format!(
                "negative amount on account {}",
                entry.account_id
            )));
        }
        if entry.debit_amount.is_zero() == entry.credit_amount.is_zero() {
            return Err(LedgerError::InvalidEntry(format!(
                "entry on account {} must have exactly one nonzero amount",
                entry.account_id
            )));
        }
        if entry.amount().is_zero() {
            return Err(LedgerError::InvalidEntry(format!(
                "{:?} entry on account {} carries its amount on the wrong side",
                entry.entry_type, entry.account_id
            )));
        }
        if let Some(cross) = &entry.cross_currency
            && cross.exchange_rate <= Decimal::ZERO
        {
            return Err(LedgerError::InvalidEntry(format!(
                "exchange rate on account {} must be positive",
                entry.account_id
            )));
        }
    }
    Ok(())
}

/// Checks that a proposed entry set balances.
pub struct DoubleEntryValidator<'a> {
    resolver: &'a ExchangeRateResolver,
}

impl<'a> DoubleEntryValidator<'a> {
    /// Creates a validator that valuates foreign legs through `resolver`.
    #[must_use]
    pub const fn new(resolver: &'a ExchangeRateResolver) -> Self {
        Self { resolver }
    }

    /// Runs the structural and balancing rules.
    ///
    /// An unbalanced set is `Ok` with `is_balanced == false`. Errors are
    /// structural problems, unknown accounts, or rates that cannot be resolved.
    pub async fn check(
        &self,
        entries: &[ProposedEntry],
        accounts: &HashMap<AccountId, Account>,
        date: NaiveDate,
    ) -> Result<BalanceCheck, LedgerError> {
        check_structure(entries)?;

        let currencies = entries
            .iter()
            .map(|entry| {
                accounts
                    .get(&entry.account_id)
                    .map(|account| &account.currency)
                    .ok_or(LedgerError::AccountNotFound(entry.account_id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let base = currencies
            .first()
            .map(|code| (*code).clone())
            .ok_or_else(|| LedgerError::InvalidEntry("empty entry set".to_string()))?;

        let mut total_debit = Decimal::ZERO;
        let mut total_credit = Decimal::ZERO;
        for (entry, currency) in entries.iter().zip(&currencies) {
            let amount = if **currency == base {
                entry.amount()
            } else {
                self.valuate(entry, currency, &base, date).await?
            };
            match entry.entry_type {
                EntryType::Debit => total_debit += amount,
                EntryType::Credit => total_credit += amount,
            }
        }

        Ok(BalanceCheck {
            is_balanced: (total_debit - total_credit).abs() <= BALANCE_TOLERANCE,
            valuation_currency: base,
            total_debit,
            total_credit,
        })
    }

    /// Value of a foreign-currency entry in the valuation currency.
    async fn valuate(
        &self,
        entry: &ProposedEntry,
        currency: &CurrencyCode,
        base: &CurrencyCode,
        date: NaiveDate,
    ) -> Result<Decimal, LedgerError> {
        // A declared rate from the base currency converts straight back.
        if let Some(cross) = &entry.cross_currency
            && cross.original_currency == *base
            && let Some(value) = CurrencyService::unconvert(entry.amount(), cross.exchange_rate)
        {
            return Ok(value);
        }

        let conversion = self
            .resolver
            .convert(entry.amount(), currency, base, date)
            .await?;
        Ok(conversion.converted_amount)
    }
}
