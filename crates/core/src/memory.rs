//! In-memory implementation of every store trait.
//!
//! One `tokio::sync::Mutex` guards all state, so each call is its own atomic
//! scope. Postings are applied to scratch copies and swapped in only when
//! every step succeeded. Used by tests and by API tests.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use ledgerly_shared::types::{AccountId, CurrencyCode, TagBalanceId, TagId, TransactionId};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::currency::{CacheWrite, ExchangeRate, RateCache, RateError};
use crate::ledger::balance::balance_delta;
use crate::ledger::{Account, LedgerError, LedgerStore, PostedTransaction, PostingRequest};
use crate::tags::rules::{RemovalPlan, plan_assign, plan_remove, summarize};
use crate::tags::{
    AllocationResult, Tag, TagBalance, TagBalanceStore, TagBalanceValidation, TagOperation,
    TagOperationKind,
};

type TagBalanceKey = (TagId, AccountId, CurrencyCode);
type RateKey = (CurrencyCode, CurrencyCode, NaiveDate);

#[derive(Default)]
struct State {
    accounts: HashMap<AccountId, Account>,
    tags: HashMap<TagId, Tag>,
    transactions: HashMap<TransactionId, PostedTransaction>,
    tag_balances: HashMap<TagBalanceKey, TagBalance>,
    rates: HashMap<RateKey, Decimal>,
}

/// Ledger, tag balance and rate cache store held in process memory.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account with its opening balance.
    pub async fn insert_account(&self, account: Account) -> AccountId {
        let id = account.id;
        self.state.lock().await.accounts.insert(id, account);
        id
    }

    /// Registers a tag.
    pub async fn insert_tag(&self, tag: Tag) -> TagId {
        let id = tag.id;
        self.state.lock().await.tags.insert(id, tag);
        id
    }

    /// Snapshot of an account.
    pub async fn account(&self, id: AccountId) -> Option<Account> {
        self.state.lock().await.accounts.get(&id).cloned()
    }

    /// Number of committed transactions.
    pub async fn transaction_count(&self) -> usize {
        self.state.lock().await.transactions.len()
    }

    /// Number of cached exchange rates.
    pub async fn rate_count(&self) -> usize {
        self.state.lock().await.rates.len()
    }
}

fn apply_assign(
    accounts: &HashMap<AccountId, Account>,
    tags: &HashMap<TagId, Tag>,
    balances: &mut HashMap<TagBalanceKey, TagBalance>,
    tag_id: TagId,
    account_id: AccountId,
    amount: Decimal,
) -> Result<TagBalance, LedgerError> {
    let account = accounts
        .get(&account_id)
        .ok_or(LedgerError::AccountNotFound(account_id))?;
    if !tags.contains_key(&tag_id) {
        return Err(LedgerError::TagNotFound(tag_id));
    }

    let key = (tag_id, account_id, account.currency.clone());
    let current = balances.get(&key).map_or(Decimal::ZERO, |row| row.balance);
    let next = plan_assign(current, amount, account.balance)?;

    let row = balances.entry(key).or_insert_with(|| TagBalance {
        id: TagBalanceId::new(),
        tag_id,
        account_id,
        currency: account.currency.clone(),
        balance: Decimal::ZERO,
    });
    row.balance = next;
    Ok(row.clone())
}

fn apply_remove(
    accounts: &HashMap<AccountId, Account>,
    balances: &mut HashMap<TagBalanceKey, TagBalance>,
    tag_id: TagId,
    account_id: AccountId,
    amount: Decimal,
) -> Result<AllocationResult, LedgerError> {
    let account = accounts
        .get(&account_id)
        .ok_or(LedgerError::AccountNotFound(account_id))?;

    let key = (tag_id, account_id, account.currency.clone());
    let current = balances.get(&key).map(|row| row.balance);

    match plan_remove(tag_id, account_id, current, amount)? {
        RemovalPlan::Delete => {
            balances.remove(&key);
            Ok(AllocationResult::Deleted { tag_id, account_id })
        }
        RemovalPlan::Decrement(next) => {
            let row = balances
                .get_mut(&key)
                .ok_or(LedgerError::TagBalanceNotFound { tag_id, account_id })?;
            row.balance = next;
            Ok(AllocationResult::Decremented(row.clone()))
        }
    }
}

fn apply_operation(
    accounts: &HashMap<AccountId, Account>,
    tags: &HashMap<TagId, Tag>,
    balances: &mut HashMap<TagBalanceKey, TagBalance>,
    operation: &TagOperation,
) -> Result<AllocationResult, LedgerError> {
    match operation.kind {
        TagOperationKind::Assign => apply_assign(
            accounts,
            tags,
            balances,
            operation.tag_id,
            operation.account_id,
            operation.amount,
        )
        .map(AllocationResult::Assigned),
        TagOperationKind::Remove => apply_remove(
            accounts,
            balances,
            operation.tag_id,
            operation.account_id,
            operation.amount,
        ),
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        Ok(self.account(id).await)
    }

    async fn execute(&self, request: PostingRequest) -> Result<PostedTransaction, LedgerError> {
        let mut state = self.state.lock().await;

        let mut accounts = state.accounts.clone();
        for entry in &request.entries {
            let account = accounts
                .get_mut(&entry.account_id)
                .ok_or(LedgerError::AccountNotFound(entry.account_id))?;
            account.balance += balance_delta(account.account_type, entry);
        }

        let mut posted = PostedTransaction::from_request(&request, Utc::now());
        let mut balances = None;
        if let Some(operation) = &request.allocation {
            let mut draft = state.tag_balances.clone();
            posted.allocation = Some(apply_operation(&accounts, &state.tags, &mut draft, operation)?);
            balances = Some(draft);
        }

        state.accounts = accounts;
        if let Some(balances) = balances {
            state.tag_balances = balances;
        }
        state.transactions.insert(
            posted.transaction.id,
            PostedTransaction {
                allocation: None,
                ..posted.clone()
            },
        );
        Ok(posted)
    }

    async fn find_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<PostedTransaction>, LedgerError> {
        Ok(self.state.lock().await.transactions.get(&id).cloned())
    }
}

#[async_trait]
impl TagBalanceStore for InMemoryStore {
    async fn assign(
        &self,
        tag_id: TagId,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<TagBalance, LedgerError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        apply_assign(
            &state.accounts,
            &state.tags,
            &mut state.tag_balances,
            tag_id,
            account_id,
            amount,
        )
    }

    async fn remove(
        &self,
        tag_id: TagId,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<AllocationResult, LedgerError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        apply_remove(&state.accounts, &mut state.tag_balances, tag_id, account_id, amount)
    }

    async fn find(
        &self,
        tag_id: TagId,
        account_id: AccountId,
    ) -> Result<Option<TagBalance>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state
            .tag_balances
            .values()
            .find(|row| row.tag_id == tag_id && row.account_id == account_id)
            .cloned())
    }

    async fn list_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TagBalance>, LedgerError> {
        let state = self.state.lock().await;
        if !state.accounts.contains_key(&account_id) {
            return Err(LedgerError::AccountNotFound(account_id));
        }
        // Ids are time-ordered, so this is creation order.
        let mut rows: Vec<TagBalance> = state
            .tag_balances
            .values()
            .filter(|row| row.account_id == account_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.id.into_inner());
        Ok(rows)
    }

    async fn validate(
        &self,
        tag_id: TagId,
        account_id: AccountId,
    ) -> Result<TagBalanceValidation, LedgerError> {
        let state = self.state.lock().await;
        let account = state
            .accounts
            .get(&account_id)
            .ok_or(LedgerError::AccountNotFound(account_id))?;
        if !state.tags.contains_key(&tag_id) {
            return Err(LedgerError::TagNotFound(tag_id));
        }

        Ok(summarize(
            account.balance,
            state
                .tag_balances
                .values()
                .filter(|row| row.account_id == account_id && row.currency == account.currency)
                .map(|row| row.balance),
        ))
    }
}

#[async_trait]
impl RateCache for InMemoryStore {
    async fn get(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        date: NaiveDate,
    ) -> Result<Option<Decimal>, RateError> {
        let state = self.state.lock().await;
        Ok(state
            .rates
            .get(&(from.clone(), to.clone(), date))
            .copied())
    }

    async fn insert(&self, rate: &ExchangeRate) -> Result<CacheWrite, RateError> {
        let mut state = self.state.lock().await;
        let key = (
            rate.from_currency.clone(),
            rate.to_currency.clone(),
            rate.rate_date,
        );
        match state.rates.entry(key) {
            Entry::Occupied(_) => Ok(CacheWrite::AlreadyPresent),
            Entry::Vacant(slot) => {
                slot.insert(rate.rate);
                Ok(CacheWrite::Inserted)
            }
        }
    }

    async fn upsert_many(&self, rates: &[ExchangeRate]) -> Result<usize, RateError> {
        let mut state = self.state.lock().await;
        for rate in rates {
            state.rates.insert(
                (
                    rate.from_currency.clone(),
                    rate.to_currency.clone(),
                    rate.rate_date,
                ),
                rate.rate,
            );
        }
        Ok(rates.len())
    }
}
