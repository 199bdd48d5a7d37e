use crate::domain::money::{Amount, Balance, Currency};
use crate::domain::ports::WalletStoreBox;
use crate::domain::wallet::{OwnerId, Wallet, WalletId};
use crate::error::{LedgerError, Result};
use tracing::{debug, info};

/// Sole owner of balance mutation.
///
/// Holds no balance state of its own: every read goes to the store and every
/// mutation is one atomic `increment_balance`, so concurrent debits on one
/// wallet are linearized by the store.
pub struct WalletAccessor {
    store: WalletStoreBox,
    default_currency: Currency,
}

impl WalletAccessor {
    pub fn new(store: WalletStoreBox, default_currency: Currency) -> Self {
        Self {
            store,
            default_currency,
        }
    }

    /// Returns the owner's wallet, creating an empty one in the default
    /// currency if needed.
    pub async fn get_or_create(&self, owner: &OwnerId) -> Result<Wallet> {
        self.provision(owner, self.default_currency.clone()).await
    }

    /// Like `get_or_create` with an explicit currency. An existing wallet is
    /// returned unchanged whatever its currency.
    pub async fn provision(&self, owner: &OwnerId, currency: Currency) -> Result<Wallet> {
        if let Some(wallet) = self.store.wallet_by_owner(owner).await? {
            return Ok(wallet);
        }

        match self
            .store
            .create_wallet(Wallet::new(owner.clone(), currency))
            .await
        {
            Ok(wallet) => {
                info!(owner = %owner, wallet_id = %wallet.id, currency = %wallet.currency, "wallet created");
                Ok(wallet)
            }
            // Another request created it first.
            Err(LedgerError::Conflict(_)) => self.find(owner).await,
            Err(e) => Err(e),
        }
    }

    pub async fn find(&self, owner: &OwnerId) -> Result<Wallet> {
        self.store
            .wallet_by_owner(owner)
            .await?
            .ok_or_else(|| LedgerError::WalletNotFound(owner.to_string()))
    }

    pub async fn credit(&self, owner: &OwnerId, amount: Amount) -> Result<Balance> {
        let wallet = self.find(owner).await?;
        self.credit_wallet(&wallet.id, amount).await
    }

    /// Credits regardless of the active flag; compensation must always land.
    pub async fn credit_wallet(&self, id: &WalletId, amount: Amount) -> Result<Balance> {
        let balance = self.store.increment_balance(id, amount.value()).await?;
        debug!(wallet_id = %id, %amount, %balance, "wallet credited");
        Ok(balance)
    }

    pub async fn debit(&self, owner: &OwnerId, amount: Amount) -> Result<Balance> {
        let wallet = self.find(owner).await?;
        if !wallet.active {
            return Err(LedgerError::WalletInactive(owner.to_string()));
        }
        self.debit_wallet(&wallet.id, amount).await
    }

    /// Single conditional decrement: either the whole amount leaves the wallet
    /// or `InsufficientFunds` is returned and nothing changes.
    pub async fn debit_wallet(&self, id: &WalletId, amount: Amount) -> Result<Balance> {
        let balance = self.store.increment_balance(id, -amount.value()).await?;
        debug!(wallet_id = %id, %amount, %balance, "wallet debited");
        Ok(balance)
    }

    pub async fn get_balance(&self, owner: &OwnerId) -> Result<Balance> {
        Ok(self.find(owner).await?.balance)
    }

    pub async fn deactivate(&self, owner: &OwnerId) -> Result<Wallet> {
        let wallet = self.find(owner).await?;
        let wallet = self.store.set_wallet_active(&wallet.id, false).await?;
        info!(owner = %owner, wallet_id = %wallet.id, "wallet deactivated");
        Ok(wallet)
    }

    pub async fn all(&self) -> Result<Vec<Wallet>> {
        self.store.all_wallets().await
    }
}
