//! Domain requests accepted by the transaction composer.

use chrono::NaiveDate;
use ledgerly_shared::types::{AccountId, CurrencyCode, TagId};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Money earned into an asset account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IncomeRequest {
    /// Account receiving the money (debited).
    pub asset_account_id: AccountId,
    /// Income account the money comes from (credited).
    pub income_account_id: AccountId,
    /// Amount, strictly positive.
    pub amount: Decimal,
    /// Defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
}

/// Money spent from an asset account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExpenseRequest {
    /// Expense account (debited).
    pub expense_account_id: AccountId,
    /// Account paying (credited).
    pub asset_account_id: AccountId,
    /// Amount, strictly positive.
    pub amount: Decimal,
    /// Defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
}

/// Money moved between two accounts, possibly across currencies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransferRequest {
    /// Source account (credited).
    pub from_account_id: AccountId,
    /// Destination account (debited).
    pub to_account_id: AccountId,
    /// Amount in the source currency, strictly positive.
    pub amount: Decimal,
    /// Defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Overrides the source account's currency.
    #[serde(default)]
    pub from_currency: Option<CurrencyCode>,
    /// Overrides the destination account's currency.
    #[serde(default)]
    pub to_currency: Option<CurrencyCode>,
    /// Custom rate (1 source = rate destination) instead of a resolved one.
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
}

/// A plain request plus the tag it allocates to or from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tagged<T> {
    /// The plain request.
    #[serde(flatten)]
    pub request: T,
    /// Tag receiving (income, transfer) or releasing (expense) the amount.
    pub tag_id: TagId,
}

/// Every request the composer accepts, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionRequest {
    /// Plain income.
    Income(IncomeRequest),
    /// Plain expense.
    Expense(ExpenseRequest),
    /// Plain transfer.
    Transfer(TransferRequest),
    /// Income, then assign to a tag on the asset account.
    TaggedIncome(Tagged<IncomeRequest>),
    /// Expense, then remove from a tag on the asset account.
    TaggedExpense(Tagged<ExpenseRequest>),
    /// Transfer, then assign to a tag on the destination account.
    TaggedTransfer(Tagged<TransferRequest>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_deserialize_plain_income() {
        let asset = AccountId::new();
        let income = AccountId::new();
        let request: TransactionRequest = serde_json::from_value(json!({
            "type": "income",
            "asset_account_id": asset,
            "income_account_id": income,
            "amount": "5000",
            "description": "Salary"
        }))
        .unwrap();

        let TransactionRequest::Income(req) = request else {
            panic!("expected income");
        };
        assert_eq!(req.asset_account_id, asset);
        assert_eq!(req.amount, dec!(5000));
        assert_eq!(req.date, None);
    }

    #[test]
    fn test_deserialize_tagged_transfer() {
        let tag = TagId::new();
        let request: TransactionRequest = serde_json::from_value(json!({
            "type": "tagged_transfer",
            "from_account_id": AccountId::new(),
            "to_account_id": AccountId::new(),
            "amount": "4000",
            "date": "2026-03-01",
            "to_currency": "lkr",
            "tag_id": tag
        }))
        .unwrap();

        let TransactionRequest::TaggedTransfer(tagged) = request else {
            panic!("expected tagged transfer");
        };
        assert_eq!(tagged.tag_id, tag);
        assert_eq!(tagged.request.to_currency.unwrap().as_str(), "LKR");
        assert_eq!(tagged.request.date, NaiveDate::from_ymd_opt(2026, 3, 1));
        assert!(tagged.request.description.is_empty());
    }

    #[test]
    fn test_rejects_unknown_type() {
        let result = serde_json::from_value::<TransactionRequest>(json!({
            "type": "refund",
            "amount": "1"
        }));
        assert!(result.is_err());
    }
}
