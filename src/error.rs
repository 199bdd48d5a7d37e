use crate::domain::transaction::TransactionStatus;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by every layer of the ledger.
///
/// Store and journal errors propagate unchanged; gateway failures are
/// translated into `GatewayUnavailable` / `GatewayRejected` by the
/// orchestrator only.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Wallet {0} is inactive")]
    WalletInactive(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
    },

    #[error("Reference {0} is already in use")]
    ReferenceInUse(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transaction {id} is already {current:?}, refusing {requested:?}")]
    AlreadyTerminal {
        id: String,
        current: TransactionStatus,
        requested: TransactionStatus,
    },

    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("Payment gateway rejected the request: {0}")]
    GatewayRejected(String),

    #[error("Transient failure, retry with the same reference: {0}")]
    Retryable(String),

    #[error("Ledger inconsistent for {reference}: {detail}")]
    Inconsistent { reference: String, detail: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
}

impl LedgerError {
    /// Whether the caller may repeat the whole operation with the same reference.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::GatewayUnavailable(_) | LedgerError::Retryable(_) | LedgerError::Conflict(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
