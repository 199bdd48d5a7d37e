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
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Wallet records keyed by wallet id.
pub const CF_WALLETS: &str = "wallets";
/// Owner id to wallet id index.
pub const CF_OWNERS: &str = "owners";
/// Transaction records keyed by transaction id.
pub const CF_TRANSACTIONS: &str = "transactions";
/// Reference to transaction id index.
pub const CF_REFERENCES: &str = "references";

/// A persistent ledger store on RocksDB.
///
/// Records are JSON values in separate column families, with secondary
/// indexes kept in the same `WriteBatch` as the record they point to.
/// Read-modify-write primitives are serialized through `write_lock`; plain
/// reads go straight to the database.
///
/// `Clone` shares both the database handle and the lock.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a database at `path` with all column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_WALLETS, CF_OWNERS, CF_TRANSACTIONS, CF_REFERENCES]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| LedgerError::Storage(format!("column family {} not found", name)))
    }

    fn read<T: DeserializeOwned>(&self, family: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(family)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, family: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(family)?;
        self.db.put_cf(cf, key, serde_json::to_vec(value)?)?;
        Ok(())
    }

    fn scan<T: DeserializeOwned>(&self, family: &str) -> Result<Vec<T>> {
        let cf = self.cf(family)?;
        let mut items = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            items.push(serde_json::from_slice(&value)?);
        }
        Ok(items)
    }

    fn load_transaction(&self, id: &TransactionId) -> Result<Transaction> {
        self.read(CF_TRANSACTIONS, id.0.as_bytes())?
            .ok_or_else(|| LedgerError::TransactionNotFound(id.to_string()))
    }

    fn load_wallet(&self, id: &WalletId) -> Result<Wallet> {
        self.read(CF_WALLETS, id.0.as_bytes())?
            .ok_or_else(|| LedgerError::WalletNotFound(id.to_string()))
    }
}

#[async_trait]
impl WalletStore for RocksDBStore {
    async fn create_wallet(&self, wallet: Wallet) -> Result<Wallet> {
        let _guard = self.write_lock.lock().await;
        let owners = self.cf(CF_OWNERS)?;
        let owner_key = wallet.owner_id.as_str().as_bytes();
        if self.db.get_pinned_cf(owners, owner_key)?.is_some() {
            return Err(LedgerError::Conflict(format!(
                "owner {} already has a wallet",
                wallet.owner_id
            )));
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_WALLETS)?, wallet.id.0.as_bytes(), serde_json::to_vec(&wallet)?);
        batch.put_cf(owners, owner_key, wallet.id.0.as_bytes());
        self.db.write(batch)?;
        Ok(wallet)
    }

    async fn wallet(&self, id: &WalletId) -> Result<Option<Wallet>> {
        self.read(CF_WALLETS, id.0.as_bytes())
    }

    async fn wallet_by_owner(&self, owner: &OwnerId) -> Result<Option<Wallet>> {
        let owners = self.cf(CF_OWNERS)?;
        match self.db.get_cf(owners, owner.as_str().as_bytes())? {
            Some(id) => self.read(CF_WALLETS, &id),
            None => Ok(None),
        }
    }

    async fn increment_balance(&self, id: &WalletId, delta: Decimal) -> Result<Balance> {
        let _guard = self.write_lock.lock().await;
        let mut wallet = self.load_wallet(id)?;

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
        self.write(CF_WALLETS, id.0.as_bytes(), &wallet)?;
        Ok(wallet.balance)
    }

    async fn set_wallet_active(&self, id: &WalletId, active: bool) -> Result<Wallet> {
        let _guard = self.write_lock.lock().await;
        let mut wallet = self.load_wallet(id)?;
        wallet.active = active;
        wallet.updated_at = Utc::now();
        self.write(CF_WALLETS, id.0.as_bytes(), &wallet)?;
        Ok(wallet)
    }

    async fn all_wallets(&self) -> Result<Vec<Wallet>> {
        let mut wallets: Vec<Wallet> = self.scan(CF_WALLETS)?;
        wallets.sort_by(|a, b| a.owner_id.cmp(&b.owner_id));
        Ok(wallets)
    }
}

#[async_trait]
impl TransactionStore for RocksDBStore {
    async fn create_transaction(&self, tx: Transaction) -> Result<Transaction> {
        let _guard = self.write_lock.lock().await;
        let references = self.cf(CF_REFERENCES)?;
        if self
            .db
            .get_pinned_cf(references, tx.reference.as_bytes())?
            .is_some()
        {
            return Err(LedgerError::Conflict(format!(
                "reference {} already recorded",
                tx.reference
            )));
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf(CF_TRANSACTIONS)?, tx.id.0.as_bytes(), serde_json::to_vec(&tx)?);
        batch.put_cf(references, tx.reference.as_bytes(), tx.id.0.as_bytes());
        self.db.write(batch)?;
        Ok(tx)
    }

    async fn transaction(&self, id: &TransactionId) -> Result<Option<Transaction>> {
        self.read(CF_TRANSACTIONS, id.0.as_bytes())
    }

    async fn transaction_by_reference(&self, reference: &str) -> Result<Option<Transaction>> {
        let references = self.cf(CF_REFERENCES)?;
        match self.db.get_cf(references, reference.as_bytes())? {
            Some(id) => self.read(CF_TRANSACTIONS, &id),
            None => Ok(None),
        }
    }

    async fn compare_and_swap_status(
        &self,
        id: &TransactionId,
        expected: TransactionStatus,
        change: StatusChange,
    ) -> Result<Transaction> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.load_transaction(id)?;
        if tx.status != expected {
            return Err(LedgerError::Conflict(format!(
                "transaction {} is {:?}, expected {:?}",
                id, tx.status, expected
            )));
        }
        tx.apply(&change);
        self.write(CF_TRANSACTIONS, id.0.as_bytes(), &tx)?;
        Ok(tx)
    }

    async fn compare_and_swap_settlement(
        &self,
        id: &TransactionId,
        expected: Settlement,
        next: Settlement,
    ) -> Result<Transaction> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.load_transaction(id)?;
        if tx.settlement != expected {
            return Err(LedgerError::Conflict(format!(
                "transaction {} settlement is {:?}, expected {:?}",
                id, tx.settlement, expected
            )));
        }
        tx.settlement = next;
        tx.updated_at = Utc::now();
        self.write(CF_TRANSACTIONS, id.0.as_bytes(), &tx)?;
        Ok(tx)
    }

    async fn set_provider_transaction(
        &self,
        id: &TransactionId,
        provider_transaction_id: &str,
    ) -> Result<Transaction> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.load_transaction(id)?;
        tx.record_provider_transaction(provider_transaction_id)?;
        self.write(CF_TRANSACTIONS, id.0.as_bytes(), &tx)?;
        Ok(tx)
    }

    async fn transactions_for_wallet(
        &self,
        wallet_id: &WalletId,
        page: PageRequest,
    ) -> Result<Page<Transaction>> {
        // Full scan: there is no wallet index yet.
        let mut matching: Vec<Transaction> = self
            .scan::<Transaction>(CF_TRANSACTIONS)?
            .into_iter()
            .filter(|tx| &tx.wallet_id == wallet_id)
            .collect();
        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(Page::slice(matching, page))
    }

    async fn delete_transaction(&self, id: &TransactionId) -> Result<Option<Transaction>> {
        let _guard = self.write_lock.lock().await;
        let Some(tx) = self.read::<Transaction>(CF_TRANSACTIONS, id.0.as_bytes())? else {
            return Ok(None);
        };

        // The reference entry is kept so the reference stays taken.
        self.db.delete_cf(self.cf(CF_TRANSACTIONS)?, id.0.as_bytes())?;
        Ok(Some(tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::{Amount, Currency};
    use crate::domain::transaction::{NewTransaction, TransactionType};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

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
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        for name in [CF_WALLETS, CF_OWNERS, CF_TRANSACTIONS, CF_REFERENCES] {
            assert!(store.db.cf_handle(name).is_some(), "missing {}", name);
        }
    }

    #[tokio::test]
    async fn test_rocksdb_wallet_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let wallet = Wallet::new(OwnerId::new("user-1"), Currency::new("NGN").unwrap());
        store.create_wallet(wallet.clone()).await.unwrap();
        assert!(matches!(
            store
                .create_wallet(Wallet::new(OwnerId::new("user-1"), Currency::new("NGN").unwrap()))
                .await,
            Err(LedgerError::Conflict(_))
        ));

        store.increment_balance(&wallet.id, dec!(250)).await.unwrap();
        assert!(matches!(
            store.increment_balance(&wallet.id, dec!(-300)).await,
            Err(LedgerError::InsufficientFunds { .. })
        ));

        let by_owner = store
            .wallet_by_owner(&OwnerId::new("user-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_owner.balance, Balance::new(dec!(250)));
        assert_eq!(store.all_wallets().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rocksdb_transaction_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        let wallet_id = WalletId::generate();

        let tx = store.create_transaction(pending(wallet_id, "REF-1")).await.unwrap();
        assert!(matches!(
            store.create_transaction(pending(wallet_id, "REF-1")).await,
            Err(LedgerError::Conflict(_))
        ));

        let done = store
            .compare_and_swap_status(&tx.id, TransactionStatus::Pending, StatusChange::success())
            .await
            .unwrap();
        assert_eq!(done.status, TransactionStatus::Success);

        let by_ref = store.transaction_by_reference("REF-1").await.unwrap().unwrap();
        assert_eq!(by_ref, done);

        store.delete_transaction(&tx.id).await.unwrap();
        assert!(store.transaction_by_reference("REF-1").await.unwrap().is_none());
        assert!(matches!(
            store.create_transaction(pending(wallet_id, "REF-1")).await,
            Err(LedgerError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_rocksdb_increment_overflow() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        let wallet = Wallet::new(OwnerId::new("user-1"), Currency::new("NGN").unwrap());
        store.create_wallet(wallet.clone()).await.unwrap();
        store.increment_balance(&wallet.id, Decimal::MAX).await.unwrap();

        assert!(matches!(
            store.increment_balance(&wallet.id, dec!(1)).await,
            Err(LedgerError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_rocksdb_survives_reopen() {
        let dir = tempdir().unwrap();
        let wallet = Wallet::new(OwnerId::new("user-1"), Currency::new("NGN").unwrap());
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            store.create_wallet(wallet.clone()).await.unwrap();
            store.increment_balance(&wallet.id, dec!(75)).await.unwrap();
        }

        let store = RocksDBStore::open(dir.path()).unwrap();
        let reloaded = store.wallet(&wallet.id).await.unwrap().unwrap();
        assert_eq!(reloaded.balance, Balance::new(dec!(75)));
    }
}
