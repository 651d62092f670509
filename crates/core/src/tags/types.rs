//! Tag and tag balance types.

use ledgerly_shared::types::{AccountId, CurrencyCode, TagBalanceId, TagId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A budgeting label. Carries no behaviour of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag ID.
    pub id: TagId,
    /// Unique name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional display colour.
    pub color: Option<String>,
}

impl Tag {
    /// Creates a tag with just a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TagId::new(),
            name: name.into(),
            description: None,
            color: None,
        }
    }
}

/// Virtual sub-balance of one tag inside one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagBalance {
    /// Row ID.
    pub id: TagBalanceId,
    /// The tag.
    pub tag_id: TagId,
    /// The backing account.
    pub account_id: AccountId,
    /// Always the account's currency.
    pub currency: CurrencyCode,
    /// Allocated amount, never negative.
    pub balance: Decimal,
}

/// Direction of a tag operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagOperationKind {
    /// Add to the tag balance.
    Assign,
    /// Take from the tag balance.
    Remove,
}

/// A single assign or remove against (tag, account).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagOperation {
    /// Assign or remove.
    pub kind: TagOperationKind,
    /// The tag.
    pub tag_id: TagId,
    /// The backing account.
    pub account_id: AccountId,
    /// Amount, strictly positive.
    pub amount: Decimal,
}

impl TagOperation {
    /// An assignment.
    #[must_use]
    pub const fn assign(tag_id: TagId, account_id: AccountId, amount: Decimal) -> Self {
        Self {
            kind: TagOperationKind::Assign,
            tag_id,
            account_id,
            amount,
        }
    }

    /// A removal.
    #[must_use]
    pub const fn remove(tag_id: TagId, account_id: AccountId, amount: Decimal) -> Self {
        Self {
            kind: TagOperationKind::Remove,
            tag_id,
            account_id,
            amount,
        }
    }
}

/// What a tag operation did to the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AllocationResult {
    /// Row created or increased.
    Assigned(TagBalance),
    /// Row decreased but still positive.
    Decremented(TagBalance),
    /// Row removed because its balance reached exactly zero.
    Deleted {
        /// The tag.
        tag_id: TagId,
        /// The backing account.
        account_id: AccountId,
    },
}

/// Advisory check of all tag balances of an account against its balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagBalanceValidation {
    /// True when the tag total does not exceed the account balance.
    pub is_valid: bool,
    /// Sum of every tag balance on the account in its currency.
    pub total_tag_balances: Decimal,
    /// Current account balance.
    pub account_balance: Decimal,
    /// `account_balance - total_tag_balances`; negative when invalid.
    pub available_balance: Decimal,
}
