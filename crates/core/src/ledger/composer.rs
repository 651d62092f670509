//! Transaction composer.
//!
//! Maps income, expense and transfer requests onto entry sets, validates
//! them and hands them to the executor. Tagged variants also run one tag
//! operation: after the commit in [`AllocationMode::Sequential`], or inside
//! the same atomic scope in [`AllocationMode::Atomic`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use ledgerly_shared::AllocationMode;
use ledgerly_shared::types::{AccountId, CurrencyCode, TagId, TransactionId};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use super::error::LedgerError;
use super::requests::{
    ExpenseRequest, IncomeRequest, Tagged, TransactionRequest, TransferRequest,
};
use super::store::LedgerStore;
use super::types::{
    Account, CrossCurrency, PostedTransaction, PostingRequest, ProposedEntry, TransactionHeader,
    TransactionType,
};
use super::validation::DoubleEntryValidator;
use crate::currency::{CurrencyService, ExchangeRateResolver};
use crate::tags::rules::ensure_amount;
use crate::tags::{TagBalanceAllocator, TagOperation};

/// DEBIT asset / CREDIT income.
#[must_use]
pub fn income_entries(asset: AccountId, income: AccountId, amount: Decimal) -> Vec<ProposedEntry> {
    vec![
        ProposedEntry::debit(asset, amount),
        ProposedEntry::credit(income, amount),
    ]
}

/// DEBIT expense / CREDIT asset.
#[must_use]
pub fn expense_entries(expense: AccountId, asset: AccountId, amount: Decimal) -> Vec<ProposedEntry> {
    vec![
        ProposedEntry::debit(expense, amount),
        ProposedEntry::credit(asset, amount),
    ]
}

/// DEBIT destination / CREDIT source, one currency.
#[must_use]
pub fn transfer_entries(from: AccountId, to: AccountId, amount: Decimal) -> Vec<ProposedEntry> {
    vec![
        ProposedEntry::debit(to, amount),
        ProposedEntry::credit(from, amount),
    ]
}

/// Legs of a transfer across currencies.
#[derive(Debug, Clone)]
pub struct CrossTransfer {
    /// Source account.
    pub from: AccountId,
    /// Destination account.
    pub to: AccountId,
    /// Amount leaving the source, in the source currency.
    pub amount: Decimal,
    /// Amount arriving at the destination, in the destination currency.
    pub converted_amount: Decimal,
    /// Source currency.
    pub source_currency: CurrencyCode,
    /// Destination currency.
    pub destination_currency: CurrencyCode,
    /// 1 source = rate destination.
    pub rate: Decimal,
}

/// DEBIT destination with the converted amount / CREDIT source with the amount.
///
/// Each leg records the other side's amount and currency, with the rate that
/// converts it into the leg's own currency, so either leg can be inverted.
pub fn cross_currency_transfer_entries(
    transfer: &CrossTransfer,
) -> Result<Vec<ProposedEntry>, LedgerError> {
    let inverse = CurrencyService::inverse(transfer.rate).ok_or_else(|| {
        LedgerError::InvalidEntry("exchange rate must be positive".to_string())
    })?;

    Ok(vec![
        ProposedEntry::debit(transfer.to, transfer.converted_amount).with_cross_currency(
            CrossCurrency {
                original_amount: transfer.amount,
                original_currency: transfer.source_currency.clone(),
                exchange_rate: transfer.rate,
            },
        ),
        ProposedEntry::credit(transfer.from, transfer.amount).with_cross_currency(CrossCurrency {
            original_amount: transfer.converted_amount,
            original_currency: transfer.destination_currency.clone(),
            exchange_rate: inverse,
        }),
    ])
}

/// Composes, validates and posts transactions.
pub struct TransactionComposer {
    store: Arc<dyn LedgerStore>,
    resolver: Arc<ExchangeRateResolver>,
    allocator: TagBalanceAllocator,
    allocation_mode: AllocationMode,
}

impl TransactionComposer {
    /// Creates a composer in sequential allocation mode.
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        resolver: Arc<ExchangeRateResolver>,
        allocator: TagBalanceAllocator,
    ) -> Self {
        Self {
            store,
            resolver,
            allocator,
            allocation_mode: AllocationMode::Sequential,
        }
    }

    /// Sets how tagged variants apply their tag operation.
    #[must_use]
    pub fn with_allocation_mode(mut self, mode: AllocationMode) -> Self {
        self.allocation_mode = mode;
        self
    }

    /// The configured allocation mode.
    #[must_use]
    pub const fn allocation_mode(&self) -> AllocationMode {
        self.allocation_mode
    }

    /// Dispatches any request variant.
    pub async fn create(&self, request: TransactionRequest) -> Result<PostedTransaction, LedgerError> {
        match request {
            TransactionRequest::Income(request) => self.income(request).await,
            TransactionRequest::Expense(request) => self.expense(request).await,
            TransactionRequest::Transfer(request) => self.transfer(request).await,
            TransactionRequest::TaggedIncome(Tagged { request, tag_id }) => {
                self.tagged_income(request, tag_id).await
            }
            TransactionRequest::TaggedExpense(Tagged { request, tag_id }) => {
                self.tagged_expense(request, tag_id).await
            }
            TransactionRequest::TaggedTransfer(Tagged { request, tag_id }) => {
                self.tagged_transfer(request, tag_id).await
            }
        }
    }

    /// Posts an income.
    pub async fn income(&self, request: IncomeRequest) -> Result<PostedTransaction, LedgerError> {
        self.post_income(request, None).await
    }

    /// Posts an income, then assigns the amount to `tag_id` on the asset account.
    pub async fn tagged_income(
        &self,
        request: IncomeRequest,
        tag_id: TagId,
    ) -> Result<PostedTransaction, LedgerError> {
        self.post_income(request, Some(tag_id)).await
    }

    /// Posts an expense.
    pub async fn expense(&self, request: ExpenseRequest) -> Result<PostedTransaction, LedgerError> {
        self.post_expense(request, None).await
    }

    /// Posts an expense, then removes the amount from `tag_id` on the asset account.
    pub async fn tagged_expense(
        &self,
        request: ExpenseRequest,
        tag_id: TagId,
    ) -> Result<PostedTransaction, LedgerError> {
        self.post_expense(request, Some(tag_id)).await
    }

    /// Posts a transfer.
    pub async fn transfer(&self, request: TransferRequest) -> Result<PostedTransaction, LedgerError> {
        self.post_transfer(request, None).await
    }

    /// Posts a transfer, then assigns the arriving amount to `tag_id` on the destination.
    pub async fn tagged_transfer(
        &self,
        request: TransferRequest,
        tag_id: TagId,
    ) -> Result<PostedTransaction, LedgerError> {
        self.post_transfer(request, Some(tag_id)).await
    }

    /// Reads a committed transaction back.
    pub async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<PostedTransaction>, LedgerError> {
        self.store.find_transaction(id).await
    }

    async fn post_income(
        &self,
        request: IncomeRequest,
        tag_id: Option<TagId>,
    ) -> Result<PostedTransaction, LedgerError> {
        ensure_amount(request.amount)?;
        let accounts = self
            .load_accounts(&[request.asset_account_id, request.income_account_id])
            .await?;

        let entries = income_entries(request.asset_account_id, request.income_account_id, request.amount);
        let allocation =
            tag_id.map(|tag| TagOperation::assign(tag, request.asset_account_id, request.amount));
        let header = header(
            request.description,
            request.amount,
            request.date,
            TransactionType::Income,
            tag_id,
        );

        self.post(header, entries, &accounts, allocation).await
    }

    async fn post_expense(
        &self,
        request: ExpenseRequest,
        tag_id: Option<TagId>,
    ) -> Result<PostedTransaction, LedgerError> {
        ensure_amount(request.amount)?;
        let accounts = self
            .load_accounts(&[request.expense_account_id, request.asset_account_id])
            .await?;

        let entries = expense_entries(request.expense_account_id, request.asset_account_id, request.amount);
        let allocation =
            tag_id.map(|tag| TagOperation::remove(tag, request.asset_account_id, request.amount));
        let header = header(
            request.description,
            request.amount,
            request.date,
            TransactionType::Expense,
            tag_id,
        );

        self.post(header, entries, &accounts, allocation).await
    }

    async fn post_transfer(
        &self,
        request: TransferRequest,
        tag_id: Option<TagId>,
    ) -> Result<PostedTransaction, LedgerError> {
        ensure_amount(request.amount)?;
        if request.from_account_id == request.to_account_id {
            return Err(LedgerError::InvalidEntry(
                "transfer needs two distinct accounts".to_string(),
            ));
        }
        let accounts = self
            .load_accounts(&[request.from_account_id, request.to_account_id])
            .await?;
        let date = request.date.unwrap_or_else(today);

        let source_currency = match request.from_currency {
            Some(code) => code,
            None => currency_of(&accounts, request.from_account_id)?,
        };
        let destination_currency = match request.to_currency {
            Some(code) => code,
            None => currency_of(&accounts, request.to_account_id)?,
        };

        let (entries, arriving) = if source_currency == destination_currency {
            (
                transfer_entries(request.from_account_id, request.to_account_id, request.amount),
                request.amount,
            )
        } else {
            let (rate, converted_amount) = match request.exchange_rate {
                Some(rate) if rate > Decimal::ZERO => (rate, CurrencyService::convert(request.amount, rate)),
                Some(_) => {
                    return Err(LedgerError::InvalidEntry(
                        "exchange rate must be positive".to_string(),
                    ));
                }
                None => {
                    let conversion = self
                        .resolver
                        .convert(request.amount, &source_currency, &destination_currency, date)
                        .await?;
                    (conversion.exchange_rate, conversion.converted_amount)
                }
            };

            let entries = cross_currency_transfer_entries(&CrossTransfer {
                from: request.from_account_id,
                to: request.to_account_id,
                amount: request.amount,
                converted_amount,
                source_currency,
                destination_currency,
                rate,
            })?;
            (entries, converted_amount)
        };

        let allocation = tag_id.map(|tag| TagOperation::assign(tag, request.to_account_id, arriving));
        let header = header(
            request.description,
            request.amount,
            Some(date),
            TransactionType::Transfer,
            tag_id,
        );

        self.post(header, entries, &accounts, allocation).await
    }

    /// Validator, then executor, then (sequential mode) the allocator.
    async fn post(
        &self,
        header: TransactionHeader,
        entries: Vec<ProposedEntry>,
        accounts: &HashMap<AccountId, Account>,
        allocation: Option<TagOperation>,
    ) -> Result<PostedTransaction, LedgerError> {
        let check = DoubleEntryValidator::new(&self.resolver)
            .check(&entries, accounts, header.date)
            .await?;
        if !check.is_balanced {
            warn!(
                debit = %check.total_debit,
                credit = %check.total_credit,
                currency = %check.valuation_currency,
                "Rejected unbalanced transaction"
            );
            return Err(LedgerError::UnbalancedEntry {
                debit: check.total_debit,
                credit: check.total_credit,
                currency: check.valuation_currency,
            });
        }

        let (in_scope, after_commit) = match self.allocation_mode {
            AllocationMode::Atomic => (allocation, None),
            AllocationMode::Sequential => (None, allocation),
        };

        let mut posted = self
            .store
            .execute(PostingRequest {
                header,
                entries,
                allocation: in_scope,
            })
            .await?;
        info!(
            transaction_id = %posted.transaction.id,
            transaction_type = ?posted.transaction.transaction_type,
            amount = %posted.transaction.amount,
            entries = posted.entries.len(),
            "Transaction posted"
        );

        if let Some(operation) = after_commit {
            match self.allocator.apply(&operation).await {
                Ok(outcome) => posted.allocation = Some(outcome),
                Err(err) => {
                    error!(
                        transaction_id = %posted.transaction.id,
                        tag_id = %operation.tag_id,
                        error = %err,
                        "Transaction committed but tag allocation failed"
                    );
                    return Err(err);
                }
            }
        }

        Ok(posted)
    }

    async fn load_accounts(
        &self,
        ids: &[AccountId],
    ) -> Result<HashMap<AccountId, Account>, LedgerError> {
        let mut accounts = HashMap::with_capacity(ids.len());
        for id in ids {
            let account = self
                .store
                .find_account(*id)
                .await?
                .ok_or(LedgerError::AccountNotFound(*id))?;
            accounts.insert(*id, account);
        }
        Ok(accounts)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn header(
    description: String,
    amount: Decimal,
    date: Option<NaiveDate>,
    transaction_type: TransactionType,
    tag_id: Option<TagId>,
) -> TransactionHeader {
    TransactionHeader {
        description,
        amount,
        date: date.unwrap_or_else(today),
        transaction_type,
        tag_id,
    }
}

fn currency_of(
    accounts: &HashMap<AccountId, Account>,
    id: AccountId,
) -> Result<CurrencyCode, LedgerError> {
    accounts
        .get(&id)
        .map(|account| account.currency.clone())
        .ok_or(LedgerError::AccountNotFound(id))
}
