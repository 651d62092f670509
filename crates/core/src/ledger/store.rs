//! Ledger store contract.

use async_trait::async_trait;
use ledgerly_shared::types::{AccountId, TransactionId};

use super::error::LedgerError;
use super::types::{Account, PostedTransaction, PostingRequest};

/// Atomic persistence for postings.
///
/// `execute` is the ledger transaction executor: it writes the header, every
/// entry and every account balance delta in one all-or-nothing scope. Balance
/// changes are applied as in-place increments, never read-then-write. When the
/// request carries an allocation, the tag operation joins the same scope.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Point lookup of an account.
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, LedgerError>;

    /// Commits a validated posting.
    ///
    /// Any failure leaves no trace: no header, no entries, no balance change.
    async fn execute(&self, request: PostingRequest) -> Result<PostedTransaction, LedgerError>;

    /// Reads a committed transaction back with its entries.
    async fn find_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<PostedTransaction>, LedgerError>;
}
