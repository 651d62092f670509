//! Account repository: registry and balance verification.

use chrono::Utc;
use ledgerly_core::currency::AMOUNT_SCALE;
use ledgerly_core::ledger::{
    Account, AccountType, LedgerError, LedgerMovement, TransactionEntry, replay_entries,
};
use ledgerly_shared::types::{AccountId, CurrencyCode};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;

use super::mapping::{account_from_model, entry_from_model, store_err};
use crate::entities::{accounts, transaction_entries};

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Account currency.
    pub currency: CurrencyCode,
    /// Balance the account opens with.
    pub opening_balance: Decimal,
    /// Optional description.
    pub description: Option<String>,
}

/// Stored balance next to the movement its entries explain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceVerification {
    /// Balance column as stored.
    pub stored_balance: Decimal,
    /// Replay of every committed entry on the account.
    pub movement: LedgerMovement,
}

impl BalanceVerification {
    /// Balance the account must have opened with for the two to agree.
    #[must_use]
    pub fn implied_opening_balance(&self) -> Decimal {
        self.stored_balance - self.movement.net_change
    }
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account with its opening balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank, the opening balance carries more
    /// decimal places than the balance column stores, or the insert fails.
    pub async fn create_account(&self, input: CreateAccountInput) -> Result<Account, LedgerError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidEntry(
                "account name must not be empty".to_string(),
            ));
        }
        if input.opening_balance.normalize().scale() > AMOUNT_SCALE {
            return Err(LedgerError::InvalidAmount(input.opening_balance));
        }

        let model = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            name: Set(name.to_string()),
            account_type: Set(input.account_type.into()),
            balance: Set(input.opening_balance),
            currency: Set(input.currency.into()),
            description: Set(input.description),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(store_err)?;

        account_from_model(model)
    }

    /// Finds an account by ID.
    pub async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err)?
            .map(account_from_model)
            .transpose()
    }

    /// Lists every account by name.
    pub async fn list(&self) -> Result<Vec<Account>, LedgerError> {
        accounts::Entity::find()
            .order_by_asc(accounts::Column::Name)
            .all(&self.db)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(account_from_model)
            .collect()
    }

    /// Every committed entry on an account, oldest first.
    pub async fn entries(&self, id: AccountId) -> Result<Vec<TransactionEntry>, LedgerError> {
        transaction_entries::Entity::find()
            .filter(transaction_entries::Column::AccountId.eq(id.into_inner()))
            .order_by_asc(transaction_entries::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(entry_from_model)
            .collect()
    }

    /// Replays the account's entries with its normal-balance convention.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for an unknown account.
    pub async fn verify_balance(&self, id: AccountId) -> Result<BalanceVerification, LedgerError> {
        let account = self
            .find_by_id(id)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))?;
        let entries = self.entries(id).await?;

        Ok(BalanceVerification {
            stored_balance: account.balance,
            movement: replay_entries(id, account.account_type, &entries),
        })
    }
}
