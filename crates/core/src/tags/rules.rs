//! Allocation rules shared by every tag balance store.
//!
//! Stores load the current state inside their atomic scope, ask these
//! functions what to do, then write the outcome.

use ledgerly_shared::types::{AccountId, TagId};
use rust_decimal::Decimal;

use super::types::TagBalanceValidation;
use crate::currency::AMOUNT_SCALE;
use crate::ledger::LedgerError;

/// How a removal changes the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPlan {
    /// Balance reaches exactly zero: delete the row.
    Delete,
    /// Store this new balance.
    Decrement(Decimal),
}

/// Rejects zero and negative amounts, and amounts with more than
/// [`AMOUNT_SCALE`] significant decimal places. Trailing zeros are ignored.
pub fn ensure_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount > Decimal::ZERO && amount.normalize().scale() <= AMOUNT_SCALE {
        Ok(())
    } else {
        Err(LedgerError::InvalidAmount(amount))
    }
}

/// Returns the new tag balance after assigning `amount`.
///
/// Only this tag's running total is compared to the account balance; the
/// aggregate over all tags is reported by [`summarize`].
pub fn plan_assign(
    current: Decimal,
    amount: Decimal,
    account_balance: Decimal,
) -> Result<Decimal, LedgerError> {
    ensure_amount(amount)?;

    let prospective = current + amount;
    if prospective > account_balance {
        return Err(LedgerError::ExceedsAccountBalance {
            requested: prospective,
            available: account_balance,
        });
    }
    Ok(prospective)
}

/// Decides how removing `amount` changes the row for (tag, account).
pub fn plan_remove(
    tag_id: TagId,
    account_id: AccountId,
    current: Option<Decimal>,
    amount: Decimal,
) -> Result<RemovalPlan, LedgerError> {
    ensure_amount(amount)?;

    let current = current.ok_or(LedgerError::TagBalanceNotFound { tag_id, account_id })?;
    if amount > current {
        return Err(LedgerError::InsufficientTagBalance {
            requested: amount,
            available: current,
        });
    }

    if amount == current {
        Ok(RemovalPlan::Delete)
    } else {
        Ok(RemovalPlan::Decrement(current - amount))
    }
}

/// Compares the sum of an account's tag balances with the account balance.
pub fn summarize(
    account_balance: Decimal,
    tag_balances: impl IntoIterator<Item = Decimal>,
) -> TagBalanceValidation {
    let total_tag_balances: Decimal = tag_balances.into_iter().sum();
    TagBalanceValidation {
        is_valid: total_tag_balances <= account_balance,
        total_tag_balances,
        account_balance,
        available_balance: account_balance - total_tag_balances,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_assign_within_balance() {
        assert_eq!(plan_assign(dec!(0), dec!(4000), dec!(10000)).unwrap(), dec!(4000));
        assert_eq!(plan_assign(dec!(4000), dec!(6000), dec!(10000)).unwrap(), dec!(10000));
    }

    #[test]
    fn test_assign_exceeding_balance() {
        let err = plan_assign(dec!(4000), dec!(7000), dec!(10000)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::ExceedsAccountBalance { requested, available }
                if requested == dec!(11000) && available == dec!(10000)
        ));
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-5))]
    #[case(dec!(0.00001))]
    #[case(dec!(100.12345))]
    fn test_invalid_amounts_rejected(#[case] amount: Decimal) {
        assert!(matches!(
            plan_assign(dec!(0), amount, dec!(100)),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            plan_remove(TagId::new(), AccountId::new(), Some(dec!(10)), amount),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[rstest]
    #[case(dec!(0.0001))]
    #[case(dec!(100.1234))]
    #[case(dec!(100.12340000))]
    fn test_four_decimal_amounts_accepted(#[case] amount: Decimal) {
        assert!(ensure_amount(amount).is_ok());
    }

    #[test]
    fn test_remove_plans() {
        let (tag, account) = (TagId::new(), AccountId::new());
        assert_eq!(
            plan_remove(tag, account, Some(dec!(4000)), dec!(4000)).unwrap(),
            RemovalPlan::Delete
        );
        assert_eq!(
            plan_remove(tag, account, Some(dec!(4000)), dec!(1500)).unwrap(),
            RemovalPlan::Decrement(dec!(2500))
        );
        assert!(matches!(
            plan_remove(tag, account, Some(dec!(4000)), dec!(4000.01)),
            Err(LedgerError::InsufficientTagBalance { .. })
        ));
        assert!(matches!(
            plan_remove(tag, account, None, dec!(1)),
            Err(LedgerError::TagBalanceNotFound { .. })
        ));
    }

    #[test]
    fn test_summarize_reports_aggregate() {
        let ok = summarize(dec!(10000), [dec!(4000), dec!(5000)]);
        assert!(ok.is_valid);
        assert_eq!(ok.total_tag_balances, dec!(9000));
        assert_eq!(ok.available_balance, dec!(1000));

        let over = summarize(dec!(10000), [dec!(6000), dec!(6000)]);
        assert!(!over.is_valid);
        assert_eq!(over.available_balance, dec!(-2000));

        let empty = summarize(dec!(50), Vec::new());
        assert!(empty.is_valid);
        assert_eq!(empty.total_tag_balances, Decimal::ZERO);
    }
}
