use super::money::Amount;
use super::wallet::WalletId;
use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Opaque key-value bag attached to a transaction by its caller.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Time-ordered transaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub Uuid);

impl TransactionId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Credit,
    Debit,
    Transfer,
    BillPayment,
    FundWallet,
    Withdrawal,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    #[serde(alias = "completed")]
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

/// The terminal state a pending transaction may move to.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Outcome {
    Success,
    Failed,
}

impl From<Outcome> for TransactionStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => TransactionStatus::Success,
            Outcome::Failed => TransactionStatus::Failed,
        }
    }
}

/// Where the transaction's balance effect stands.
///
/// `Claimed` marks a flow that is about to mutate the wallet on behalf of this
/// transaction; only the holder of the token may move it on.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Settlement {
    #[default]
    Unapplied,
    Claimed {
        token: Uuid,
    },
    Applied,
    Reversed,
}

impl Settlement {
    pub fn claim() -> Self {
        Settlement::Claimed {
            token: Uuid::new_v4(),
        }
    }
}

/// Bill-payment details carried by a `bill_payment` transaction.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct BillPayment {
    pub provider: String,
    pub bill_reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_transaction_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub id: TransactionId,
    pub wallet_id: WalletId,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Amount,
    pub status: TransactionStatus,
    pub reference: String,
    pub description: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill: Option<BillPayment>,
    #[serde(default)]
    pub settlement: Settlement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Builds a fresh pending record from a journal request.
    pub fn pending(new: NewTransaction) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::generate(),
            wallet_id: new.wallet_id,
            kind: new.kind,
            amount: new.amount,
            status: TransactionStatus::Pending,
            reference: new.reference,
            description: new.description,
            metadata: new.metadata,
            bill: new.bill,
            settlement: Settlement::Unapplied,
            failure_reason: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Applies a terminal status change in place. Callers check the current
    /// status first; stores do so under their write lock.
    pub fn apply(&mut self, change: &StatusChange) {
        let now = Utc::now();
        self.status = change.outcome.into();
        self.failure_reason = change.reason.clone();
        if let (Some(bill), Some(provider_tx)) = (self.bill.as_mut(), &change.provider_transaction_id)
        {
            bill.provider_transaction_id = Some(provider_tx.clone());
        }
        self.updated_at = now;
        self.completed_at = Some(now);
    }

    /// Stores the provider's id for this bill while it is still in flight.
    pub fn record_provider_transaction(
        &mut self,
        provider_transaction_id: &str,
    ) -> Result<(), LedgerError> {
        let Some(bill) = self.bill.as_mut() else {
            return Err(LedgerError::Validation(format!(
                "transaction {} is not a bill payment",
                self.reference
            )));
        };
        bill.provider_transaction_id = Some(provider_transaction_id.to_string());
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Request to open a pending transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub wallet_id: WalletId,
    pub kind: TransactionType,
    pub amount: Amount,
    pub reference: String,
    pub description: String,
    pub metadata: Metadata,
    pub bill: Option<BillPayment>,
}

impl NewTransaction {
    pub fn new(
        wallet_id: WalletId,
        kind: TransactionType,
        amount: Amount,
        reference: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            wallet_id,
            kind,
            amount,
            reference: reference.into(),
            description: description.into(),
            metadata: Metadata::new(),
            bill: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_bill(mut self, bill: BillPayment) -> Self {
        self.bill = Some(bill);
        self
    }
}

/// Terminal transition requested from the journal.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub outcome: Outcome,
    pub reason: Option<String>,
    pub provider_transaction_id: Option<String>,
}

impl StatusChange {
    pub fn success() -> Self {
        Self {
            outcome: Outcome::Success,
            reason: None,
            provider_transaction_id: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failed,
            reason: Some(reason.into()),
            provider_transaction_id: None,
        }
    }

    pub fn with_provider_transaction(mut self, id: Option<String>) -> Self {
        self.provider_transaction_id = id;
        self
    }
}
