use crate::domain::money::Balance;
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::{TransactionStore, WalletStore};
use crate::domain::transaction::{
    Settlement, StatusChange, Transaction, TransactionId, TransactionStatus,
};
use crate::domain::wallet::{OwnerId, Wallet, WalletId};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct WalletTable {
    wallets: HashMap<WalletId, Wallet>,
    owners: HashMap<OwnerId, WalletId>,
}

/// A thread-safe in-memory wallet store.
///
/// Every mutation holds the write lock for its whole read-modify-write, which
/// makes `increment_balance` the linearization point for a wallet.
#[derive(Default, Clone)]
pub struct InMemoryWalletStore {
    table: Arc<RwLock<WalletTable>>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn create_wallet(&self, wallet: Wallet) -> Result<Wallet> {
        let mut table = self.table.write().await;
        if table.owners.contains_key(&wallet.owner_id) {
            return Err(LedgerError::Conflict(format!(
                "owner {} already has a wallet",
                wallet.owner_id
            )));
        }
        table.owners.insert(wallet.owner_id.clone(), wallet.id);
        table.wallets.insert(wallet.id, wallet.clone());
        Ok(wallet)
    }

    async fn wallet(&self, id: &WalletId) -> Result<Option<Wallet>> {
        let table = self.table.read().await;
        Ok(table.wallets.get(id).cloned())
    }

    async fn wallet_by_owner(&self, owner: &OwnerId) -> Result<Option<Wallet>> {
        let table = self.table.read().await;
        Ok(table
            .owners
            .get(owner)
            .and_then(|id| table.wallets.get(id))
            .cloned())
    }

    async fn increment_balance(&self, id: &WalletId, delta: Decimal) -> Result<Balance> {
        let mut table = self.table.write().await;
        let wallet = table
            .wallets
            .get_mut(id)
            .ok_or_else(|| LedgerError::WalletNotFound(id.to_string()))?;

        let next = wallet.balance.checked_add(delta).ok_or_else(|| {
            LedgerError::Validation(format!("balance of wallet {} would overflow", id))
        })?;
        if next.value() < Decimal::ZERO {
            return Err(LedgerError::InsufficientFunds {
                available: wallet.balance.value(),
                requested: -delta,
            });
        }
        wallet.balance = next;
        wallet.updated_at = Utc::now();
        Ok(wallet.balance)
    }

    async fn set_wallet_active(&self, id: &WalletId, active: bool) -> Result<Wallet> {
        let mut table = self.table.write().await;
        let wallet = table
            .wallets
            .get_mut(id)
            .ok_or_else(|| LedgerError::WalletNotFound(id.to_string()))?;
        wallet.active = active;
        wallet.updated_at = Utc::now();
        Ok(wallet.clone())
    }

    async fn all_wallets(&self) -> Result<Vec<Wallet>> {
        let table = self.table.read().await;
        let mut wallets: Vec<Wallet> = table.wallets.values().cloned().collect();
        wallets.sort_by(|a, b| a.owner_id.cmp(&b.owner_id));
        Ok(wallets)
    }
}

#[derive(Default)]
struct TransactionTable {
    transactions: HashMap<TransactionId, Transaction>,
    references: HashMap<String, TransactionId>,
}

/// A thread-safe in-memory transaction store with a unique reference index.
///
/// A reference stays in the index after its record is deleted, so it can
/// never be recorded again.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    table: Arc<RwLock<TransactionTable>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn create_transaction(&self, tx: Transaction) -> Result<Transaction> {
        let mut table = self.table.write().await;
        if table.references.contains_key(&tx.reference) {
            return Err(LedgerError::Conflict(format!(
                "reference {} already recorded",
                tx.reference
            )));
        }
        table.references.insert(tx.reference.clone(), tx.id);
        table.transactions.insert(tx.id, tx.clone());
        Ok(tx)
    }

    async fn transaction(&self, id: &TransactionId) -> Result<Option<Transaction>> {
        let table = self.table.read().await;
        Ok(table.transactions.get(id).cloned())
    }

    async fn transaction_by_reference(&self, reference: &str) -> Result<Option<Transaction>> {
        let table = self.table.read().await;
        Ok(table
            .references
            .get(reference)
            .and_then(|id| table.transactions.get(id))
            .cloned())
    }

    async fn compare_and_swap_status(
        &self,
        id: &TransactionId,
        expected: TransactionStatus,
        change: StatusChange,
    ) -> Result<Transaction> {
        let mut table = self.table.write().await;
        let tx = table
            .transactions
            .get_mut(id)
            .ok_or_else(|| LedgerError::TransactionNotFound(id.to_string()))?;
        if tx.status != expected {
            return Err(LedgerError::Conflict(format!(
                "transaction {} is {:?}, expected {:?}",
                id, tx.status, expected
            )));
        }
        tx.apply(&change);
        Ok(tx.clone())
    }

    async fn compare_and_swap_settlement(
        &self,
        id: &TransactionId,
        expected: Settlement,
        next: Settlement,
    ) -> Result<Transaction> {
        let mut table = self.table.write().await;
        let tx = table
            .transactions
            .get_mut(id)
            .ok_or_else(|| LedgerError::TransactionNotFound(id.to_string()))?;
        if tx.settlement != expected {
            return Err(LedgerError::Conflict(format!(
                "transaction {} settlement is {:?}, expected {:?}",
                id, tx.settlement, expected
            )));
        }
        tx.settlement = next;
        tx.updated_at = Utc::now();
        Ok(tx.clone())
    }

    async fn transactions_for_wallet(
        &self,
        wallet_id: &WalletId,
        page: PageRequest,
    ) -> Result<Page<Transaction>> {
        let table = self.table.read().await;
        let mut matching: Vec<Transaction> = table
            .transactions
            .values()
            .filter(|tx| &tx.wallet_id == wallet_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(Page::slice(matching, page))
    }

    async fn set_provider_transaction(
        &self,
        id: &TransactionId,
        provider_transaction_id: &str,
    ) -> Result<Transaction> {
        let mut table = self.table.write().await;
        let tx = table
            .transactions
            .get_mut(id)
            .ok_or_else(|| LedgerError::TransactionNotFound(id.to_string()))?;
        tx.record_provider_transaction(provider_transaction_id)?;
        Ok(tx.clone())
    }

    async fn delete_transaction(&self, id: &TransactionId) -> Result<Option<Transaction>> {
        let mut table = self.table.write().await;
        Ok(table.transactions.remove(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::{Amount, Currency};
    use crate::domain::transaction::{NewTransaction, TransactionType};
    use rust_decimal_macros::dec;

    fn wallet(owner: &str) -> Wallet {
        Wallet::new(OwnerId::new(owner), Currency::new("NGN").unwrap())
    }

    fn pending(wallet_id: WalletId, reference: &str) -> Transaction {
        Transaction::pending(NewTransaction::new(
            wallet_id,
            TransactionType::FundWallet,
            Amount::new(dec!(100)).unwrap(),
            reference,
            "Wallet funding",
        ))
    }

    #[tokio::test]
    async fn test_wallet_owner_is_unique() {
        let store = InMemoryWalletStore::new();
        store.create_wallet(wallet("user-1")).await.unwrap();

        let err = store.create_wallet(wallet("user-1")).await.unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
        assert_eq!(store.all_wallets().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_increment_refuses_negative_balance() {
        let store = InMemoryWalletStore::new();
        let w = store.create_wallet(wallet("user-1")).await.unwrap();

        assert_eq!(
            store.increment_balance(&w.id, dec!(100)).await.unwrap(),
            Balance::new(dec!(100))
        );
        let err = store.increment_balance(&w.id, dec!(-150)).await.unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));

        let reloaded = store.wallet(&w.id).await.unwrap().unwrap();
        assert_eq!(reloaded.balance, Balance::new(dec!(100)));
    }

    #[tokio::test]
    async fn test_increment_unknown_wallet() {
        let store = InMemoryWalletStore::new();
        let err = store
            .increment_balance(&WalletId::generate(), dec!(1))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::WalletNotFound(_)));
    }

    #[tokio::test]
    async fn test_reference_is_unique() {
        let store = InMemoryTransactionStore::new();
        let wallet_id = WalletId::generate();
        store.create_transaction(pending(wallet_id, "REF-1")).await.unwrap();

        let err = store
            .create_transaction(pending(wallet_id, "REF-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_compare_and_swap_status() {
        let store = InMemoryTransactionStore::new();
        let tx = store
            .create_transaction(pending(WalletId::generate(), "REF-1"))
            .await
            .unwrap();

        let done = store
            .compare_and_swap_status(&tx.id, TransactionStatus::Pending, StatusChange::success())
            .await
            .unwrap();
        assert_eq!(done.status, TransactionStatus::Success);

        let err = store
            .compare_and_swap_status(
                &tx.id,
                TransactionStatus::Pending,
                StatusChange::failed("late"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_settlement_claim_is_exclusive() {
        let store = InMemoryTransactionStore::new();
        let tx = store
            .create_transaction(pending(WalletId::generate(), "REF-1"))
            .await
            .unwrap();

        let first = Settlement::claim();
        store
            .compare_and_swap_settlement(&tx.id, Settlement::Unapplied, first)
            .await
            .unwrap();
        let err = store
            .compare_and_swap_settlement(&tx.id, Settlement::Unapplied, Settlement::claim())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));

        let applied = store
            .compare_and_swap_settlement(&tx.id, first, Settlement::Applied)
            .await
            .unwrap();
        assert_eq!(applied.settlement, Settlement::Applied);
    }

    #[tokio::test]
    async fn test_transactions_for_wallet_newest_first() {
        let store = InMemoryTransactionStore::new();
        let wallet_id = WalletId::generate();
        for i in 1..=3 {
            store
                .create_transaction(pending(wallet_id, &format!("REF-{}", i)))
                .await
                .unwrap();
        }
        store
            .create_transaction(pending(WalletId::generate(), "OTHER"))
            .await
            .unwrap();

        let page = store
            .transactions_for_wallet(&wallet_id, PageRequest::default())
            .await
            .unwrap();
        let refs: Vec<&str> = page.items.iter().map(|t| t.reference.as_str()).collect();
        assert_eq!(refs, vec!["REF-3", "REF-2", "REF-1"]);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_delete_keeps_reference_reserved() {
        let store = InMemoryTransactionStore::new();
        let wallet_id = WalletId::generate();
        let tx = store
            .create_transaction(pending(wallet_id, "REF-1"))
            .await
            .unwrap();

        assert!(store.delete_transaction(&tx.id).await.unwrap().is_some());
        assert!(store.transaction_by_reference("REF-1").await.unwrap().is_none());
        assert!(store.delete_transaction(&tx.id).await.unwrap().is_none());
        assert!(matches!(
            store.create_transaction(pending(wallet_id, "REF-1")).await,
            Err(LedgerError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_increment_overflow_leaves_balance() {
        let store = InMemoryWalletStore::new();
        let wallet = store.create_wallet(wallet("user-1")).await.unwrap();
        store.increment_balance(&wallet.id, Decimal::MAX).await.unwrap();

        assert!(matches!(
            store.increment_balance(&wallet.id, dec!(1)).await,
            Err(LedgerError::Validation(_))
        ));
        assert_eq!(
            store.wallet(&wallet.id).await.unwrap().unwrap().balance,
            Balance::new(Decimal::MAX)
        );
    }
}
