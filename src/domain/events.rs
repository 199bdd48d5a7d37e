use super::transaction::{Transaction, TransactionId, TransactionStatus, TransactionType};
use super::wallet::WalletId;
use rust_decimal::Decimal;
use serde::Serialize;

pub const PAYMENT_SUCCESS: &str = "payment.success";
pub const PAYMENT_FAILURE: &str = "payment.failure";
pub const TRANSACTION_ROLLBACK: &str = "transaction.rollback";

/// Lifecycle notification handed to the event notifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEvent {
    pub name: &'static str,
    pub transaction_id: TransactionId,
    pub reference: String,
    pub wallet_id: WalletId,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    pub status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl LedgerEvent {
    fn from_transaction(name: &'static str, tx: &Transaction, reason: Option<String>) -> Self {
        Self {
            name,
            transaction_id: tx.id,
            reference: tx.reference.clone(),
            wallet_id: tx.wallet_id,
            kind: tx.kind,
            amount: tx.amount.value(),
            status: tx.status,
            reason,
        }
    }

    pub fn payment_success(tx: &Transaction) -> Self {
        Self::from_transaction(PAYMENT_SUCCESS, tx, None)
    }

    pub fn payment_failure(tx: &Transaction) -> Self {
        Self::from_transaction(PAYMENT_FAILURE, tx, tx.failure_reason.clone())
    }

    /// Raised when a compensating credit could not be written; `detail` is
    /// what a reconciliation job needs to retry it.
    pub fn rollback_required(tx: &Transaction, detail: impl Into<String>) -> Self {
        Self::from_transaction(TRANSACTION_ROLLBACK, tx, Some(detail.into()))
    }
}
