//! Transaction repository: the PostgreSQL ledger executor.
//!
//! A posting is one database transaction: header, entries, then one
//! `UPDATE accounts SET balance = balance + delta` per touched account.
//! Dropping the transaction on any error rolls everything back.
//!
//! Balance updates run in ascending account-id order, so two postings that
//! touch the same accounts always take the row locks in the same order and
//! cannot deadlock each other.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use ledgerly_core::ledger::{
    Account, AccountType, LedgerError, LedgerStore, PostedTransaction, PostingRequest,
    ProposedEntry, Transaction, TransactionEntry, balance_delta,
};
use ledgerly_shared::types::{AccountId, TransactionId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use super::mapping::{account_from_model, entry_from_model, store_err, transaction_from_model};
use super::tag_balance::apply_in;
use crate::entities::{accounts, transaction_entries, transactions};

/// PostgreSQL-backed [`LedgerStore`].
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Loads the type of every account an entry set touches.
///
/// Types never change after creation, so this read does not race with the
/// balance updates that follow.
async fn account_types<C: ConnectionTrait>(
    conn: &C,
    entries: &[ProposedEntry],
) -> Result<HashMap<AccountId, AccountType>, LedgerError> {
    let ids: Vec<_> = entries.iter().map(|e| e.account_id.into_inner()).collect();
    let found: HashMap<AccountId, AccountType> = accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(ids))
        .all(conn)
        .await
        .map_err(store_err)?
        .into_iter()
        .map(|model| (AccountId::from_uuid(model.id), model.account_type.into()))
        .collect();

    if let Some(missing) = entries.iter().find(|e| !found.contains_key(&e.account_id)) {
        return Err(LedgerError::AccountNotFound(missing.account_id));
    }
    Ok(found)
}

async fn insert_header<C: ConnectionTrait>(
    conn: &C,
    transaction: &Transaction,
) -> Result<(), LedgerError> {
    transactions::ActiveModel {
        id: Set(transaction.id.into_inner()),
        description: Set(transaction.description.clone()),
        amount: Set(transaction.amount),
        transaction_date: Set(transaction.date),
        transaction_type: Set(transaction.transaction_type.into()),
        tag_id: Set(transaction.tag_id.map(|id| id.into_inner())),
        created_at: Set(transaction.created_at.into()),
    }
    .insert(conn)
    .await
    .map_err(store_err)?;
    Ok(())
}

async fn insert_entries<C: ConnectionTrait>(
    conn: &C,
    entries: &[TransactionEntry],
) -> Result<(), LedgerError> {
    let models = entries.iter().map(|entry| transaction_entries::ActiveModel {
        id: Set(entry.id.into_inner()),
        transaction_id: Set(entry.transaction_id.into_inner()),
        account_id: Set(entry.account_id.into_inner()),
        entry_type: Set(entry.entry_type.into()),
        debit_amount: Set(entry.debit_amount),
        credit_amount: Set(entry.credit_amount),
        original_amount: Set(entry.original_amount),
        original_currency: Set(entry.original_currency.clone().map(String::from)),
        exchange_rate: Set(entry.exchange_rate),
        created_at: Set(entry.created_at.into()),
    });

    transaction_entries::Entity::insert_many(models)
        .exec_without_returning(conn)
        .await
        .map_err(store_err)?;
    Ok(())
}

/// Net balance change per account, keyed in lock order.
fn net_deltas(
    entries: &[ProposedEntry],
    types: &HashMap<AccountId, AccountType>,
) -> Result<BTreeMap<Uuid, Decimal>, LedgerError> {
    let mut deltas = BTreeMap::new();
    for entry in entries {
        let account_type = types
            .get(&entry.account_id)
            .copied()
            .ok_or(LedgerError::AccountNotFound(entry.account_id))?;
        *deltas.entry(entry.account_id.into_inner()).or_insert(Decimal::ZERO) +=
            balance_delta(account_type, entry);
    }
    Ok(deltas)
}

/// In-place balance increment. Zero affected rows means the account is gone.
async fn apply_delta<C: ConnectionTrait>(
    conn: &C,
    account_id: AccountId,
    delta: Decimal,
) -> Result<(), LedgerError> {
    let result = accounts::Entity::update_many()
        .col_expr(
            accounts::Column::Balance,
            Expr::col(accounts::Column::Balance).add(delta),
        )
        .filter(accounts::Column::Id.eq(account_id.into_inner()))
        .exec(conn)
        .await
        .map_err(store_err)?;

    if result.rows_affected == 0 {
        return Err(LedgerError::AccountNotFound(account_id));
    }
    Ok(())
}

#[async_trait]
impl LedgerStore for TransactionRepository {
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err)?
            .map(account_from_model)
            .transpose()
    }

    async fn execute(&self, request: PostingRequest) -> Result<PostedTransaction, LedgerError> {
        let txn = self.db.begin().await.map_err(store_err)?;

        let types = account_types(&txn, &request.entries).await?;
        let mut posted = PostedTransaction::from_request(&request, Utc::now());

        insert_header(&txn, &posted.transaction).await?;
        insert_entries(&txn, &posted.entries).await?;

        for (account_id, delta) in net_deltas(&request.entries, &types)? {
            apply_delta(&txn, AccountId::from_uuid(account_id), delta).await?;
        }

        if let Some(operation) = &request.allocation {
            posted.allocation = Some(apply_in(&txn, operation).await?);
        }

        txn.commit().await.map_err(store_err)?;
        debug!(
            transaction_id = %posted.transaction.id,
            entries = posted.entries.len(),
            "Posting committed"
        );
        Ok(posted)
    }

    async fn find_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<PostedTransaction>, LedgerError> {
        let Some(header) = transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err)?
        else {
            return Ok(None);
        };

        let entries = header
            .find_related(transaction_entries::Entity)
            .order_by_asc(transaction_entries::Column::CreatedAt)
            .order_by_asc(transaction_entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(entry_from_model)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(PostedTransaction {
            transaction: transaction_from_model(header),
            entries,
            allocation: None,
        }))
    }
}
