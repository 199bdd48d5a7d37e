use rust_decimal_macros::dec;
use wallet_ledger::domain::money::{Amount, Balance, Currency};
use wallet_ledger::domain::ports::{TransactionStoreBox, WalletStoreBox};
use wallet_ledger::domain::transaction::{NewTransaction, Transaction, TransactionType};
use wallet_ledger::domain::wallet::{OwnerId, Wallet};
use wallet_ledger::infrastructure::in_memory::{InMemoryTransactionStore, InMemoryWalletStore};

#[tokio::test]
async fn test_stores_as_trait_objects() {
    let wallet_store: WalletStoreBox = Box::new(InMemoryWalletStore::new());
    let transaction_store: TransactionStoreBox = Box::new(InMemoryTransactionStore::new());

    let wallet = Wallet::new(OwnerId::new("alice"), Currency::default());
    let wallet_id = wallet.id;
    let tx = Transaction::pending(NewTransaction::new(
        wallet_id,
        TransactionType::FundWallet,
        Amount::new(dec!(100.0)).unwrap(),
        "FUND-1",
        "Wallet funding",
    ));

    // Verify Send + Sync by spawning tasks
    let ws_handle = tokio::spawn(async move {
        wallet_store.create_wallet(wallet).await.unwrap();
        wallet_store
            .increment_balance(&wallet_id, dec!(100.0))
            .await
            .unwrap();
        wallet_store
            .wallet_by_owner(&OwnerId::new("alice"))
            .await
            .unwrap()
            .unwrap()
    });

    let ts_handle = tokio::spawn(async move {
        transaction_store.create_transaction(tx).await.unwrap();
        transaction_store
            .transaction_by_reference("FUND-1")
            .await
            .unwrap()
            .unwrap()
    });

    let retrieved_wallet = ws_handle.await.unwrap();
    assert_eq!(retrieved_wallet.balance, Balance::new(dec!(100)));

    let retrieved_tx = ts_handle.await.unwrap();
    assert_eq!(retrieved_tx.wallet_id, wallet_id);
}
