//! Tag balance allocator.
//!
//! Thin orchestration over a [`TagBalanceStore`]: amount checks, logging and
//! dispatch of [`TagOperation`]s. The read-check-write itself happens inside
//! the store's atomic scope using [`super::rules`].

use std::sync::Arc;

use async_trait::async_trait;
use ledgerly_shared::types::{AccountId, TagId};
use rust_decimal::Decimal;
use tracing::info;

use super::rules::ensure_amount;
use super::types::{
    AllocationResult, TagBalance, TagBalanceValidation, TagOperation, TagOperationKind,
};
use crate::ledger::LedgerError;

/// Persistence for tag balances.
///
/// `assign` and `remove` each run in one atomic scope that loads the account,
/// the tag and the current row, applies the rule and writes the result.
#[async_trait]
pub trait TagBalanceStore: Send + Sync {
    /// Adds `amount` to the (tag, account) row, creating it on first use.
    async fn assign(
        &self,
        tag_id: TagId,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<TagBalance, LedgerError>;

    /// Takes `amount` from the (tag, account) row, deleting it at exactly zero.
    async fn remove(
        &self,
        tag_id: TagId,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<AllocationResult, LedgerError>;

    /// Current row for (tag, account), if any.
    async fn find(
        &self,
        tag_id: TagId,
        account_id: AccountId,
    ) -> Result<Option<TagBalance>, LedgerError>;

    /// Every tag balance on an account.
    async fn list_for_account(&self, account_id: AccountId)
    -> Result<Vec<TagBalance>, LedgerError>;

    /// Sums every tag balance on the account and compares with its balance.
    async fn validate(
        &self,
        tag_id: TagId,
        account_id: AccountId,
    ) -> Result<TagBalanceValidation, LedgerError>;
}

/// Maintains per-tag virtual sub-balances inside accounts.
#[derive(Clone)]
pub struct TagBalanceAllocator {
    store: Arc<dyn TagBalanceStore>,
}

impl TagBalanceAllocator {
    /// Creates an allocator over a store.
    #[must_use]
    pub fn new(store: Arc<dyn TagBalanceStore>) -> Self {
        Self { store }
    }

    /// Assigns money from an account to a tag.
    pub async fn assign(
        &self,
        tag_id: TagId,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<TagBalance, LedgerError> {
        ensure_amount(amount)?;

        let balance = self.store.assign(tag_id, account_id, amount).await?;
        info!(%tag_id, %account_id, %amount, balance = %balance.balance, "Money assigned to tag");
        Ok(balance)
    }

    /// Removes money from a tag.
    pub async fn remove(
        &self,
        tag_id: TagId,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<AllocationResult, LedgerError> {
        ensure_amount(amount)?;

        let outcome = self.store.remove(tag_id, account_id, amount).await?;
        info!(%tag_id, %account_id, %amount, deleted = matches!(outcome, AllocationResult::Deleted { .. }), "Money removed from tag");
        Ok(outcome)
    }

    /// Applies one tag operation.
    pub async fn apply(&self, operation: &TagOperation) -> Result<AllocationResult, LedgerError> {
        match operation.kind {
            TagOperationKind::Assign => self
                .assign(operation.tag_id, operation.account_id, operation.amount)
                .await
                .map(AllocationResult::Assigned),
            TagOperationKind::Remove => {
                self.remove(operation.tag_id, operation.account_id, operation.amount)
                    .await
            }
        }
    }

    /// Current tag balance for (tag, account), if any.
    pub async fn get(
        &self,
        tag_id: TagId,
        account_id: AccountId,
    ) -> Result<Option<TagBalance>, LedgerError> {
        self.store.find(tag_id, account_id).await
    }

    /// Every tag balance on an account.
    pub async fn list_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TagBalance>, LedgerError> {
        self.store.list_for_account(account_id).await
    }

    /// Advisory aggregate check. Nothing is enforced here.
    pub async fn validate(
        &self,
        tag_id: TagId,
        account_id: AccountId,
    ) -> Result<TagBalanceValidation, LedgerError> {
        self.store.validate(tag_id, account_id).await
    }
}
