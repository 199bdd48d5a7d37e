use super::events::LedgerEvent;
use super::gateway::{
    AccountDetails, Bank, BillPaymentReceipt, BillPaymentRequest, GatewayError, PaymentInit,
    PaymentInitRequest, PaymentVerification,
};
use super::money::Balance;
use super::page::{Page, PageRequest};
use super::transaction::{
    Settlement, StatusChange, Transaction, TransactionId, TransactionStatus,
};
use super::wallet::{OwnerId, Wallet, WalletId};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Wallet records. Every method is atomic with respect to a single wallet.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Inserts a new wallet; `Conflict` if the owner already has one.
    async fn create_wallet(&self, wallet: Wallet) -> Result<Wallet>;
    async fn wallet(&self, id: &WalletId) -> Result<Option<Wallet>>;
    async fn wallet_by_owner(&self, owner: &OwnerId) -> Result<Option<Wallet>>;
    /// Adds `delta` to the balance and returns the new value. Fails with
    /// `InsufficientFunds`, leaving the wallet untouched, if the result would
    /// be negative.
    async fn increment_balance(&self, id: &WalletId, delta: Decimal) -> Result<Balance>;
    async fn set_wallet_active(&self, id: &WalletId, active: bool) -> Result<Wallet>;
    async fn all_wallets(&self) -> Result<Vec<Wallet>>;
}

/// Transaction records. Every method is atomic with respect to a single record.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Inserts a new record; `Conflict` if the reference is taken.
    async fn create_transaction(&self, tx: Transaction) -> Result<Transaction>;
    async fn transaction(&self, id: &TransactionId) -> Result<Option<Transaction>>;
    async fn transaction_by_reference(&self, reference: &str) -> Result<Option<Transaction>>;
    /// Applies `change` only if the stored status equals `expected`.
    async fn compare_and_swap_status(
        &self,
        id: &TransactionId,
        expected: TransactionStatus,
        change: StatusChange,
    ) -> Result<Transaction>;
    /// Replaces the settlement marker only if it equals `expected`.
    async fn compare_and_swap_settlement(
        &self,
        id: &TransactionId,
        expected: Settlement,
        next: Settlement,
    ) -> Result<Transaction>;
    /// Records the provider's id on a bill payment; status is left alone.
    async fn set_provider_transaction(
        &self,
        id: &TransactionId,
        provider_transaction_id: &str,
    ) -> Result<Transaction>;
    /// Newest first.
    async fn transactions_for_wallet(
        &self,
        wallet_id: &WalletId,
        page: PageRequest,
    ) -> Result<Page<Transaction>>;
    /// Removes the record. Its reference stays reserved.
    async fn delete_transaction(&self, id: &TransactionId) -> Result<Option<Transaction>>;
}

/// External payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize_payment(
        &self,
        request: PaymentInitRequest,
    ) -> std::result::Result<PaymentInit, GatewayError>;
    async fn verify_payment(
        &self,
        reference: &str,
    ) -> std::result::Result<PaymentVerification, GatewayError>;
    async fn process_bill_payment(
        &self,
        request: BillPaymentRequest,
    ) -> std::result::Result<BillPaymentReceipt, GatewayError>;
    /// Current state of a bill payment previously sent under `reference`.
    async fn bill_payment_status(
        &self,
        reference: &str,
    ) -> std::result::Result<BillPaymentReceipt, GatewayError>;
    async fn banks(&self) -> std::result::Result<Vec<Bank>, GatewayError>;
    async fn resolve_account(
        &self,
        account_number: &str,
        bank_code: &str,
    ) -> std::result::Result<AccountDetails, GatewayError>;
}

/// Downstream consumer of lifecycle events. Delivery is best-effort: an error
/// here is logged by the caller and never undoes the operation.
#[async_trait]
pub trait EventNotifier: Send + Sync {
    async fn notify(&self, event: &LedgerEvent) -> Result<()>;
}

pub type WalletStoreBox = Box<dyn WalletStore>;
pub type TransactionStoreBox = Box<dyn TransactionStore>;
pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
pub type EventNotifierRef = Arc<dyn EventNotifier>;
