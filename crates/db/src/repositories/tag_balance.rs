//! Tag balance repository.
//!
//! Every assign and remove runs inside one database transaction that locks
//! the account row and the (tag, account, currency) row before the
//! read-check-write, so concurrent allocations on the same pair serialize.
//! The `*_in` helpers take any connection so a posting can run them inside
//! its own transaction.

use async_trait::async_trait;
use chrono::Utc;
use ledgerly_core::ledger::LedgerError;
use ledgerly_core::tags::{
    AllocationResult, RemovalPlan, TagBalance, TagBalanceStore, TagBalanceValidation,
    TagOperation, TagOperationKind, plan_assign, plan_remove, summarize,
};
use ledgerly_shared::types::{AccountId, TagBalanceId, TagId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

use super::mapping::{store_err, tag_balance_from_model};
use crate::entities::{accounts, tag_balances, tags};

async fn locked_account<C: ConnectionTrait>(
    conn: &C,
    account_id: AccountId,
) -> Result<accounts::Model, LedgerError> {
    accounts::Entity::find_by_id(account_id.into_inner())
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(store_err)?
        .ok_or(LedgerError::AccountNotFound(account_id))
}

async fn locked_row<C: ConnectionTrait>(
    conn: &C,
    tag_id: TagId,
    account_id: AccountId,
    currency: &str,
) -> Result<Option<tag_balances::Model>, LedgerError> {
    tag_balances::Entity::find()
        .filter(tag_balances::Column::TagId.eq(tag_id.into_inner()))
        .filter(tag_balances::Column::AccountId.eq(account_id.into_inner()))
        .filter(tag_balances::Column::Currency.eq(currency))
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(store_err)
}

async fn ensure_tag<C: ConnectionTrait>(conn: &C, tag_id: TagId) -> Result<(), LedgerError> {
    tags::Entity::find_by_id(tag_id.into_inner())
        .one(conn)
        .await
        .map_err(store_err)?
        .map(|_| ())
        .ok_or(LedgerError::TagNotFound(tag_id))
}

/// Assigns `amount` to (tag, account) on the given connection.
pub(crate) async fn assign_in<C: ConnectionTrait>(
    conn: &C,
    tag_id: TagId,
    account_id: AccountId,
    amount: Decimal,
) -> Result<TagBalance, LedgerError> {
    let account = locked_account(conn, account_id).await?;
    ensure_tag(conn, tag_id).await?;

    let row = locked_row(conn, tag_id, account_id, &account.currency).await?;
    let current = row.as_ref().map_or(Decimal::ZERO, |row| row.balance);
    let next = plan_assign(current, amount, account.balance)?;

    let now = Utc::now();
    let model = match row {
        Some(row) => {
            let mut active: tag_balances::ActiveModel = row.into();
            active.balance = Set(next);
            active.updated_at = Set(now.into());
            active.update(conn).await
        }
        None => {
            debug!(%tag_id, %account_id, "Creating tag balance row");
            tag_balances::ActiveModel {
                id: Set(TagBalanceId::new().into_inner()),
                tag_id: Set(tag_id.into_inner()),
                account_id: Set(account_id.into_inner()),
                currency: Set(account.currency.clone()),
                balance: Set(next),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(conn)
            .await
        }
    }
    .map_err(store_err)?;

    tag_balance_from_model(model)
}

/// Removes `amount` from (tag, account) on the given connection.
pub(crate) async fn remove_in<C: ConnectionTrait>(
    conn: &C,
    tag_id: TagId,
    account_id: AccountId,
    amount: Decimal,
) -> Result<AllocationResult, LedgerError> {
    let account = locked_account(conn, account_id).await?;
    let row = locked_row(conn, tag_id, account_id, &account.currency).await?;

    let plan = plan_remove(tag_id, account_id, row.as_ref().map(|row| row.balance), amount)?;
    let Some(row) = row else {
        return Err(LedgerError::TagBalanceNotFound { tag_id, account_id });
    };

    match plan {
        RemovalPlan::Delete => {
            tag_balances::Entity::delete_by_id(row.id)
                .exec(conn)
                .await
                .map_err(store_err)?;
            debug!(%tag_id, %account_id, "Tag balance reached zero, row deleted");
            Ok(AllocationResult::Deleted { tag_id, account_id })
        }
        RemovalPlan::Decrement(next) => {
            let mut active: tag_balances::ActiveModel = row.into();
            active.balance = Set(next);
            active.updated_at = Set(Utc::now().into());
            let model = active.update(conn).await.map_err(store_err)?;
            Ok(AllocationResult::Decremented(tag_balance_from_model(model)?))
        }
    }
}

/// Applies one tag operation on the given connection.
pub(crate) async fn apply_in<C: ConnectionTrait>(
    conn: &C,
    operation: &TagOperation,
) -> Result<AllocationResult, LedgerError> {
    match operation.kind {
        TagOperationKind::Assign => {
            assign_in(conn, operation.tag_id, operation.account_id, operation.amount)
                .await
                .map(AllocationResult::Assigned)
        }
        TagOperationKind::Remove => {
            remove_in(conn, operation.tag_id, operation.account_id, operation.amount).await
        }
    }
}

/// PostgreSQL-backed [`TagBalanceStore`].
#[derive(Debug, Clone)]
pub struct TagBalanceRepository {
    db: DatabaseConnection,
}

impl TagBalanceRepository {
    /// Creates a new tag balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn ensure_account(&self, account_id: AccountId) -> Result<accounts::Model, LedgerError> {
        accounts::Entity::find_by_id(account_id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err)?
            .ok_or(LedgerError::AccountNotFound(account_id))
    }
}

#[async_trait]
impl TagBalanceStore for TagBalanceRepository {
    async fn assign(
        &self,
        tag_id: TagId,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<TagBalance, LedgerError> {
        let txn = self.db.begin().await.map_err(store_err)?;
        let balance = assign_in(&txn, tag_id, account_id, amount).await?;
        txn.commit().await.map_err(store_err)?;
        Ok(balance)
    }

    async fn remove(
        &self,
        tag_id: TagId,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<AllocationResult, LedgerError> {
        let txn = self.db.begin().await.map_err(store_err)?;
        let outcome = remove_in(&txn, tag_id, account_id, amount).await?;
        txn.commit().await.map_err(store_err)?;
        Ok(outcome)
    }

    async fn find(
        &self,
        tag_id: TagId,
        account_id: AccountId,
    ) -> Result<Option<TagBalance>, LedgerError> {
        tag_balances::Entity::find()
            .filter(tag_balances::Column::TagId.eq(tag_id.into_inner()))
            .filter(tag_balances::Column::AccountId.eq(account_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_err)?
            .map(tag_balance_from_model)
            .transpose()
    }

    async fn list_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TagBalance>, LedgerError> {
        self.ensure_account(account_id).await?;

        tag_balances::Entity::find()
            .filter(tag_balances::Column::AccountId.eq(account_id.into_inner()))
            .order_by_asc(tag_balances::Column::CreatedAt)
            .order_by_asc(tag_balances::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(tag_balance_from_model)
            .collect()
    }

    async fn validate(
        &self,
        tag_id: TagId,
        account_id: AccountId,
    ) -> Result<TagBalanceValidation, LedgerError> {
        let account = self.ensure_account(account_id).await?;
        ensure_tag(&self.db, tag_id).await?;

        let rows = tag_balances::Entity::find()
            .filter(tag_balances::Column::AccountId.eq(account_id.into_inner()))
            .filter(tag_balances::Column::Currency.eq(account.currency.as_str()))
            .all(&self.db)
            .await
            .map_err(store_err)?;

        Ok(summarize(account.balance, rows.into_iter().map(|row| row.balance)))
    }
}
