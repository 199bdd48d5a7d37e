use super::money::{Balance, Currency};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletId(pub Uuid);

impl WalletId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Identifier of the user owning a wallet, as issued by the caller's auth layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user's monetary balance.
///
/// Exactly one wallet exists per owner. The balance is only ever changed by the
/// store's atomic increment, never by assigning this struct back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub owner_id: OwnerId,
    pub balance: Balance,
    pub currency: Currency,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(owner_id: OwnerId, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: WalletId::generate(),
            owner_id,
            balance: Balance::ZERO,
            currency,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_wallet_is_empty_and_active() {
        let wallet = Wallet::new(OwnerId::new("user-1"), Currency::new("NGN").unwrap());
        assert_eq!(wallet.balance, Balance::ZERO);
        assert!(wallet.active);
        assert_eq!(wallet.owner_id.as_str(), "user-1");
    }

    #[test]
    fn test_wallet_json_shape() {
        let wallet = Wallet::new(OwnerId::new("user-1"), Currency::new("usd").unwrap());
        let json = serde_json::to_value(&wallet).unwrap();
        assert_eq!(json["owner_id"], "user-1");
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["active"], true);
    }
}
