use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::TransactionStoreBox;
use crate::domain::transaction::{
    NewTransaction, Settlement, StatusChange, Transaction, TransactionId, TransactionStatus,
};
use crate::domain::wallet::WalletId;
use crate::error::{LedgerError, Result};
use tracing::{debug, info, warn};

/// Result of opening a pending transaction.
///
/// `Replayed` carries the record already stored under the same reference; it
/// is the idempotent-replay signal, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingEntry {
    Created(Transaction),
    Replayed(Transaction),
}

/// Owns every transaction record and its state machine:
/// `pending -> success` or `pending -> failed`, nothing out of a terminal state.
pub struct TransactionJournal {
    store: TransactionStoreBox,
}

impl TransactionJournal {
    pub fn new(store: TransactionStoreBox) -> Self {
        Self { store }
    }

    /// Opens a pending transaction, or returns the one already recorded under
    /// the same reference. A reference whose record was deleted is never
    /// reused: it yields `ReferenceInUse`.
    pub async fn create_pending(&self, new: NewTransaction) -> Result<PendingEntry> {
        if new.reference.trim().is_empty() {
            return Err(LedgerError::Validation("Reference must not be empty".into()));
        }

        if let Some(existing) = self.store.transaction_by_reference(&new.reference).await? {
            debug!(reference = %existing.reference, "reference already recorded");
            return Ok(PendingEntry::Replayed(existing));
        }

        let reference = new.reference.clone();
        match self.store.create_transaction(Transaction::pending(new)).await {
            Ok(tx) => {
                debug!(reference = %tx.reference, kind = ?tx.kind, "pending transaction opened");
                Ok(PendingEntry::Created(tx))
            }
            // Lost a creation race, or the reference belonged to a deleted record.
            Err(LedgerError::Conflict(_)) => {
                match self.store.transaction_by_reference(&reference).await? {
                    Some(existing) => Ok(PendingEntry::Replayed(existing)),
                    None => {
                        warn!(%reference, "reference belongs to a deleted transaction");
                        Err(LedgerError::ReferenceInUse(reference))
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Moves a pending transaction to its terminal status.
    ///
    /// Repeating the same outcome is a no-op. Asking for a different outcome
    /// once terminal fails with `AlreadyTerminal` and the stored status stands.
    pub async fn mark_terminal(
        &self,
        id: &TransactionId,
        change: StatusChange,
    ) -> Result<Transaction> {
        let requested: TransactionStatus = change.outcome.into();
        match self
            .store
            .compare_and_swap_status(id, TransactionStatus::Pending, change)
            .await
        {
            Ok(tx) => {
                info!(reference = %tx.reference, status = ?tx.status, "transaction settled");
                Ok(tx)
            }
            Err(LedgerError::Conflict(_)) => {
                let current = self.find_by_id(id).await?;
                if current.status == requested {
                    return Ok(current);
                }
                warn!(
                    reference = %current.reference,
                    current = ?current.status,
                    requested = ?requested,
                    "refusing to move a terminal transaction"
                );
                Err(LedgerError::AlreadyTerminal {
                    id: id.to_string(),
                    current: current.status,
                    requested,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Moves the settlement marker from `from` to `to`; `Conflict` if another
    /// flow got there first.
    pub async fn transition_settlement(
        &self,
        id: &TransactionId,
        from: Settlement,
        to: Settlement,
    ) -> Result<Transaction> {
        self.store.compare_and_swap_settlement(id, from, to).await
    }

    /// Keeps the provider's id on a bill that is still in flight.
    pub async fn record_provider_transaction(
        &self,
        id: &TransactionId,
        provider_transaction_id: &str,
    ) -> Result<Transaction> {
        self.store
            .set_provider_transaction(id, provider_transaction_id)
            .await
    }

    pub async fn find_by_reference(&self, reference: &str) -> Result<Option<Transaction>> {
        self.store.transaction_by_reference(reference).await
    }

    pub async fn find_by_id(&self, id: &TransactionId) -> Result<Transaction> {
        self.store
            .transaction(id)
            .await?
            .ok_or_else(|| LedgerError::TransactionNotFound(id.to_string()))
    }

    pub async fn list_by_wallet(
        &self,
        wallet_id: &WalletId,
        page: PageRequest,
    ) -> Result<Page<Transaction>> {
        self.store.transactions_for_wallet(wallet_id, page).await
    }

    /// Hard-deletes a record. The wallet balance is left exactly as it is.
    pub async fn delete(&self, id: &TransactionId) -> Result<Transaction> {
        let removed = self
            .store
            .delete_transaction(id)
            .await?
            .ok_or_else(|| LedgerError::TransactionNotFound(id.to_string()))?;
        warn!(reference = %removed.reference, status = ?removed.status, "transaction deleted");
        Ok(removed)
    }
}
