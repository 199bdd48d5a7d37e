use crate::application::journal::{PendingEntry, TransactionJournal};
use crate::application::wallets::WalletAccessor;
use crate::config::EngineConfig;
use crate::domain::events::LedgerEvent;
use crate::domain::gateway::{
    AccountDetails, Bank, BillPaymentRequest, GatewayError, GatewayPaymentStatus,
    PaymentInitRequest, PaymentVerification,
};
use crate::domain::money::{Amount, Balance, Currency};
use crate::domain::page::{Page, PageRequest};
use crate::domain::ports::{
    EventNotifierRef, PaymentGatewayRef, TransactionStoreBox, WalletStoreBox,
};
use crate::domain::transaction::{
    BillPayment, Metadata, NewTransaction, Settlement, StatusChange, Transaction, TransactionId,
    TransactionStatus, TransactionType,
};
use crate::domain::wallet::{OwnerId, Wallet, WalletId};
use crate::error::{LedgerError, Result};
use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// What a caller gets back from `fund` and `pay_bill`.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOutcome {
    pub transaction: Transaction,
    /// The reference was already recorded; nothing was executed again.
    pub replayed: bool,
    /// Where the payer completes a funding, when the gateway issued one.
    pub authorization_url: Option<String>,
}

impl PaymentOutcome {
    fn new(transaction: Transaction) -> Self {
        Self {
            transaction,
            replayed: false,
            authorization_url: None,
        }
    }

    fn replay(transaction: Transaction) -> Self {
        Self {
            transaction,
            replayed: true,
            authorization_url: None,
        }
    }

    /// Still waiting on the gateway; call `verify` later.
    pub fn is_pending(&self) -> bool {
        self.transaction.status == TransactionStatus::Pending
    }
}

/// A bill payment request.
#[derive(Debug, Clone, PartialEq)]
pub struct BillPaymentOrder {
    pub owner: OwnerId,
    pub amount: Amount,
    pub bill_reference: String,
    pub provider: String,
    pub description: Option<String>,
    /// Idempotency key. Generated from `bill_reference` when absent, which
    /// makes the call non-replayable.
    pub reference: Option<String>,
    pub metadata: Metadata,
}

impl BillPaymentOrder {
    pub fn new(
        owner: impl Into<OwnerId>,
        amount: Amount,
        bill_reference: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            amount,
            bill_reference: bill_reference.into(),
            provider: provider.into(),
            description: None,
            reference: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Runs the funding, bill payment and verification protocols.
///
/// The only component that talks to the gateway, compensates, and emits
/// events. Each protocol is a sequence of small atomic store steps; no lock is
/// held across a gateway call.
pub struct PaymentOrchestrator {
    wallets: WalletAccessor,
    journal: TransactionJournal,
    gateway: PaymentGatewayRef,
    notifier: EventNotifierRef,
    gateway_timeout: Duration,
    verify_after: Duration,
}

impl PaymentOrchestrator {
    pub fn new(
        wallets: WalletAccessor,
        journal: TransactionJournal,
        gateway: PaymentGatewayRef,
        notifier: EventNotifierRef,
        config: &EngineConfig,
    ) -> Self {
        if config.verify_after < config.gateway_timeout {
            warn!(
                verify_after = ?config.verify_after,
                gateway_timeout = ?config.gateway_timeout,
                "verify threshold is shorter than the gateway timeout; verify may race in-flight calls"
            );
        }
        Self {
            wallets,
            journal,
            gateway,
            notifier,
            gateway_timeout: config.gateway_timeout,
            verify_after: config.verify_after,
        }
    }

    pub fn from_stores(
        wallet_store: WalletStoreBox,
        transaction_store: TransactionStoreBox,
        gateway: PaymentGatewayRef,
        notifier: EventNotifierRef,
        config: &EngineConfig,
    ) -> Self {
        Self::new(
            WalletAccessor::new(wallet_store, config.default_currency.clone()),
            TransactionJournal::new(transaction_store),
            gateway,
            notifier,
            config,
        )
    }

    /// Funds the owner's wallet through the gateway, creating the wallet on
    /// first use.
    ///
    /// Gateway unavailability is not an error here: the outcome comes back
    /// pending and `verify` settles it later. A known reference replays even
    /// if the wallet has been deactivated since.
    pub async fn fund(
        &self,
        owner: &OwnerId,
        amount: Amount,
        reference: &str,
    ) -> Result<PaymentOutcome> {
        let wallet = self.wallets.get_or_create(owner).await?;
        if let Some(existing) = self.journal.find_by_reference(reference).await? {
            return self.replay(existing, &wallet, TransactionType::FundWallet);
        }
        if !wallet.active {
            return Err(LedgerError::WalletInactive(owner.to_string()));
        }

        let new = NewTransaction::new(
            wallet.id,
            TransactionType::FundWallet,
            amount,
            reference,
            "Wallet funding",
        );
        let tx = match self.journal.create_pending(new).await? {
            PendingEntry::Replayed(existing) => {
                return self.replay(existing, &wallet, TransactionType::FundWallet);
            }
            PendingEntry::Created(tx) => tx,
        };

        let request = PaymentInitRequest {
            amount,
            payer_ref: owner.to_string(),
            reference: tx.reference.clone(),
            metadata: Metadata::from([(
                "wallet_id".to_string(),
                serde_json::Value::String(wallet.id.to_string()),
            )]),
        };
        let init = match self.call_gateway(self.gateway.initialize_payment(request)).await {
            Ok(init) => init,
            Err(GatewayError::Rejected(reason)) => {
                let failed = self.fail(&tx, reason.clone()).await?;
                warn!(reference = %failed.reference, %reason, "funding rejected at initialization");
                return Err(LedgerError::GatewayRejected(reason));
            }
            Err(GatewayError::Unavailable(reason)) => {
                warn!(reference = %tx.reference, %reason, "funding left pending, gateway unavailable");
                return Ok(PaymentOutcome::new(tx));
            }
        };

        let authorization_url = init.authorization_url;
        let verification = match self.call_gateway(self.gateway.verify_payment(&tx.reference)).await
        {
            Ok(verification) => verification,
            Err(GatewayError::Rejected(reason)) => {
                self.fail(&tx, reason.clone()).await?;
                return Err(LedgerError::GatewayRejected(reason));
            }
            Err(GatewayError::Unavailable(reason)) => {
                warn!(reference = %tx.reference, %reason, "funding left pending, verification unavailable");
                return Ok(PaymentOutcome {
                    authorization_url,
                    ..PaymentOutcome::new(tx)
                });
            }
        };

        let settled = self.settle_funding(tx, verification, false).await?;
        if settled.status == TransactionStatus::Failed {
            return Err(LedgerError::GatewayRejected(
                settled.failure_reason.unwrap_or_default(),
            ));
        }
        Ok(PaymentOutcome {
            authorization_url,
            ..PaymentOutcome::new(settled)
        })
    }

    /// Pays a bill from the owner's wallet.
    ///
    /// The wallet is debited before the gateway is called. If the gateway
    /// refuses or times out the debit is refunded and the transaction fails;
    /// if the refund itself cannot be written the transaction stays pending
    /// with the debit recorded and `Inconsistent` is returned.
    pub async fn pay_bill(&self, order: BillPaymentOrder) -> Result<PaymentOutcome> {
        let wallet = self.wallets.find(&order.owner).await?;
        if let Some(reference) = &order.reference
            && let Some(existing) = self.journal.find_by_reference(reference).await?
        {
            return self.replay(existing, &wallet, TransactionType::BillPayment);
        }
        if !wallet.active {
            return Err(LedgerError::WalletInactive(order.owner.to_string()));
        }

        if !wallet.balance.covers(order.amount) {
            return Err(LedgerError::InsufficientFunds {
                available: wallet.balance.value(),
                requested: order.amount.value(),
            });
        }

        let reference = order.reference.clone().unwrap_or_else(|| {
            format!("{}-{}", order.bill_reference, Uuid::new_v4().simple())
        });
        let description = order
            .description
            .clone()
            .unwrap_or_else(|| format!("{} bill payment", order.provider));
        let new = NewTransaction::new(
            wallet.id,
            TransactionType::BillPayment,
            order.amount,
            reference,
            description,
        )
        .with_metadata(order.metadata.clone())
        .with_bill(BillPayment {
            provider: order.provider.clone(),
            bill_reference: order.bill_reference.clone(),
            provider_transaction_id: None,
        });
        let tx = match self.journal.create_pending(new).await? {
            PendingEntry::Replayed(existing) => {
                return self.replay(existing, &wallet, TransactionType::BillPayment);
            }
            PendingEntry::Created(tx) => tx,
        };

        self.apply_debit(&tx).await?;

        let mut metadata = order.metadata;
        metadata.insert(
            "reference".to_string(),
            serde_json::Value::String(tx.reference.clone()),
        );
        let request = BillPaymentRequest {
            amount: order.amount,
            bill_reference: order.bill_reference,
            provider: order.provider,
            metadata,
        };

        match self.call_gateway(self.gateway.process_bill_payment(request)).await {
            Ok(receipt) => match receipt.status {
                GatewayPaymentStatus::Success => {
                    let done = self.confirm_bill(&tx, Some(receipt.transaction_id)).await?;
                    Ok(PaymentOutcome::new(done))
                }
                GatewayPaymentStatus::Pending => {
                    info!(
                        reference = %tx.reference,
                        provider_transaction_id = %receipt.transaction_id,
                        "bill payment accepted, awaiting provider"
                    );
                    let recorded = self
                        .journal
                        .record_provider_transaction(&tx.id, &receipt.transaction_id)
                        .await;
                    let tx = match recorded {
                        Ok(updated) => updated,
                        Err(e) => {
                            warn!(reference = %tx.reference, error = %e, "provider transaction id not recorded");
                            tx
                        }
                    };
                    Ok(PaymentOutcome::new(tx))
                }
                GatewayPaymentStatus::Failed | GatewayPaymentStatus::Abandoned => {
                    let reason = format!("provider reported {:?}", receipt.status).to_lowercase();
                    self.compensate(&tx, reason.clone()).await?;
                    Err(LedgerError::GatewayRejected(reason))
                }
            },
            Err(GatewayError::Rejected(reason)) => {
                self.compensate(&tx, reason.clone()).await?;
                Err(LedgerError::GatewayRejected(reason))
            }
            Err(GatewayError::Unavailable(reason)) => {
                self.compensate(&tx, reason.clone()).await?;
                Err(LedgerError::GatewayUnavailable(reason))
            }
        }
    }

    /// Returns the transaction behind `reference`, resolving it against the
    /// gateway first if it has been pending longer than the verify threshold.
    pub async fn verify(&self, reference: &str) -> Result<Transaction> {
        let tx = self.transaction(reference).await?;
        if tx.status.is_terminal() || !self.is_stale(&tx) {
            return Ok(tx);
        }

        debug!(reference = %tx.reference, settlement = ?tx.settlement, "re-verifying stale transaction");
        match tx.kind {
            TransactionType::FundWallet => self.reverify_funding(tx).await,
            TransactionType::BillPayment => self.reverify_bill(tx).await,
            _ => Ok(tx),
        }
    }

    pub async fn get_balance(&self, owner: &OwnerId) -> Result<Balance> {
        self.wallets.get_balance(owner).await
    }

    pub async fn list_transactions(
        &self,
        wallet_id: &WalletId,
        page: PageRequest,
    ) -> Result<Page<Transaction>> {
        self.journal.list_by_wallet(wallet_id, page).await
    }

    pub async fn transactions_for_owner(
        &self,
        owner: &OwnerId,
        page: PageRequest,
    ) -> Result<Page<Transaction>> {
        let wallet = self.wallets.find(owner).await?;
        self.journal.list_by_wallet(&wallet.id, page).await
    }

    pub async fn transaction(&self, reference: &str) -> Result<Transaction> {
        self.journal
            .find_by_reference(reference)
            .await?
            .ok_or_else(|| LedgerError::TransactionNotFound(reference.to_string()))
    }

    pub async fn transaction_by_id(&self, id: &TransactionId) -> Result<Transaction> {
        self.journal.find_by_id(id).await
    }

    /// Administrative hard delete. Balances are not touched.
    pub async fn delete_transaction(&self, id: &TransactionId) -> Result<Transaction> {
        self.journal.delete(id).await
    }

    pub async fn provision_wallet(&self, owner: &OwnerId, currency: Currency) -> Result<Wallet> {
        self.wallets.provision(owner, currency).await
    }

    pub async fn deactivate_wallet(&self, owner: &OwnerId) -> Result<Wallet> {
        self.wallets.deactivate(owner).await
    }

    pub async fn wallets(&self) -> Result<Vec<Wallet>> {
        self.wallets.all().await
    }

    pub async fn banks(&self) -> Result<Vec<Bank>> {
        self.call_gateway(self.gateway.banks())
            .await
            .map_err(into_ledger_error)
    }

    pub async fn resolve_account(
        &self,
        account_number: &str,
        bank_code: &str,
    ) -> Result<AccountDetails> {
        self.call_gateway(self.gateway.resolve_account(account_number, bank_code))
            .await
            .map_err(into_ledger_error)
    }

    fn replay(
        &self,
        existing: Transaction,
        wallet: &Wallet,
        kind: TransactionType,
    ) -> Result<PaymentOutcome> {
        if existing.wallet_id != wallet.id || existing.kind != kind {
            warn!(
                reference = %existing.reference,
                wallet_id = %wallet.id,
                "reference reused by a different request"
            );
            return Err(LedgerError::ReferenceInUse(existing.reference));
        }
        info!(reference = %existing.reference, status = ?existing.status, "duplicate reference, replaying");
        Ok(PaymentOutcome::replay(existing))
    }

    fn is_stale(&self, tx: &Transaction) -> bool {
        (Utc::now() - tx.created_at)
            .to_std()
            .map(|age| age >= self.verify_after)
            .unwrap_or(false)
    }

    async fn call_gateway<T>(
        &self,
        call: impl Future<Output = std::result::Result<T, GatewayError>>,
    ) -> std::result::Result<T, GatewayError> {
        match tokio::time::timeout(self.gateway_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Unavailable(format!(
                "no answer within {:?}",
                self.gateway_timeout
            ))),
        }
    }

    async fn emit(&self, event: LedgerEvent) {
        if let Err(e) = self.notifier.notify(&event).await {
            warn!(event = event.name, reference = %event.reference, error = %e, "event delivery failed");
        }
    }

    async fn fail(&self, tx: &Transaction, reason: impl Into<String>) -> Result<Transaction> {
        let failed = self
            .journal
            .mark_terminal(&tx.id, StatusChange::failed(reason))
            .await?;
        self.emit(LedgerEvent::payment_failure(&failed)).await;
        Ok(failed)
    }

    /// Credits a confirmed funding at most once. `stale` lets an abandoned
    /// payment fail instead of waiting.
    async fn settle_funding(
        &self,
        tx: Transaction,
        verification: PaymentVerification,
        stale: bool,
    ) -> Result<Transaction> {
        match verification.status {
            GatewayPaymentStatus::Success if verification.amount == tx.amount.value() => {
                self.apply_funding_credit(tx).await
            }
            GatewayPaymentStatus::Success => {
                warn!(
                    reference = %tx.reference,
                    expected = %tx.amount,
                    reported = %verification.amount,
                    "gateway amount does not match transaction"
                );
                self.fail(
                    &tx,
                    format!(
                        "amount mismatch: expected {}, gateway reported {}",
                        tx.amount, verification.amount
                    ),
                )
                .await
            }
            GatewayPaymentStatus::Failed => self.fail(&tx, "payment failed at gateway").await,
            GatewayPaymentStatus::Abandoned if stale => {
                self.fail(&tx, "payment abandoned at gateway").await
            }
            GatewayPaymentStatus::Abandoned | GatewayPaymentStatus::Pending => {
                debug!(reference = %tx.reference, status = ?verification.status, "funding not settled yet");
                Ok(tx)
            }
        }
    }

    async fn apply_funding_credit(&self, tx: Transaction) -> Result<Transaction> {
        let token = Settlement::claim();
        match self
            .journal
            .transition_settlement(&tx.id, Settlement::Unapplied, token)
            .await
        {
            Ok(_) => {}
            // Another flow owns or already applied the credit.
            Err(LedgerError::Conflict(_)) => {
                let current = self.journal.find_by_id(&tx.id).await?;
                if current.settlement == Settlement::Applied && !current.status.is_terminal() {
                    return self.complete_funding(&current).await;
                }
                return Ok(current);
            }
            Err(e) => return Err(e),
        }

        if let Err(e) = self.wallets.credit_wallet(&tx.wallet_id, tx.amount).await {
            if let Err(release) = self
                .journal
                .transition_settlement(&tx.id, token, Settlement::Unapplied)
                .await
            {
                error!(reference = %tx.reference, error = %release, "could not release funding claim");
            }
            warn!(reference = %tx.reference, error = %e, "funding credit failed, left pending");
            return Err(match e {
                // Retrying cannot help an overflowing balance.
                LedgerError::Validation(_) => e,
                other => LedgerError::Retryable(format!(
                    "credit for {} failed: {}",
                    tx.reference, other
                )),
            });
        }

        if let Err(e) = self
            .journal
            .transition_settlement(&tx.id, token, Settlement::Applied)
            .await
        {
            let detail = format!("wallet credited but settlement not recorded: {}", e);
            error!(reference = %tx.reference, %detail, "funding needs reconciliation");
            return Err(LedgerError::Inconsistent {
                reference: tx.reference.clone(),
                detail,
            });
        }

        self.complete_funding(&tx).await
    }

    async fn complete_funding(&self, tx: &Transaction) -> Result<Transaction> {
        let done = self
            .journal
            .mark_terminal(&tx.id, StatusChange::success())
            .await?;
        info!(reference = %done.reference, wallet_id = %done.wallet_id, amount = %done.amount, "wallet funded");
        self.emit(LedgerEvent::payment_success(&done)).await;
        Ok(done)
    }

    /// Debits the wallet for a freshly opened bill transaction. A failed debit
    /// marks the transaction failed; nothing has reached the gateway yet. A
    /// debit whose settlement cannot be recorded is handed to reconciliation.
    async fn apply_debit(&self, tx: &Transaction) -> Result<()> {
        let token = Settlement::claim();
        self.journal
            .transition_settlement(&tx.id, Settlement::Unapplied, token)
            .await?;

        match self.wallets.debit_wallet(&tx.wallet_id, tx.amount).await {
            Ok(balance) => {
                if let Err(e) = self
                    .journal
                    .transition_settlement(&tx.id, token, Settlement::Applied)
                    .await
                {
                    let detail = format!(
                        "wallet {} debited {} but settlement not recorded: {}",
                        tx.wallet_id, tx.amount, e
                    );
                    error!(reference = %tx.reference, %detail, "bill debit needs reconciliation");
                    self.emit(LedgerEvent::rollback_required(tx, detail.clone()))
                        .await;
                    return Err(LedgerError::Inconsistent {
                        reference: tx.reference.clone(),
                        detail,
                    });
                }
                debug!(reference = %tx.reference, %balance, "bill amount debited");
                Ok(())
            }
            Err(e) => {
                self.journal
                    .transition_settlement(&tx.id, token, Settlement::Unapplied)
                    .await?;
                self.fail(tx, e.to_string()).await?;
                match e {
                    LedgerError::InsufficientFunds { .. } => Err(e),
                    other => Err(LedgerError::Retryable(format!(
                        "debit for {} failed: {}",
                        tx.reference, other
                    ))),
                }
            }
        }
    }

    /// Marks a debited bill successful. Holding the settlement claim keeps a
    /// concurrent compensation from refunding it meanwhile.
    async fn confirm_bill(
        &self,
        tx: &Transaction,
        provider_transaction_id: Option<String>,
    ) -> Result<Transaction> {
        let token = Settlement::claim();
        match self
            .journal
            .transition_settlement(&tx.id, Settlement::Applied, token)
            .await
        {
            Ok(_) => {}
            Err(LedgerError::Conflict(_)) => return self.journal.find_by_id(&tx.id).await,
            Err(e) => return Err(e),
        }

        let marked = self
            .journal
            .mark_terminal(
                &tx.id,
                StatusChange::success().with_provider_transaction(provider_transaction_id),
            )
            .await;
        if let Err(e) = self
            .journal
            .transition_settlement(&tx.id, token, Settlement::Applied)
            .await
        {
            error!(reference = %tx.reference, error = %e, "could not release bill claim");
        }

        let done = marked?;
        info!(reference = %done.reference, wallet_id = %done.wallet_id, amount = %done.amount, "bill paid");
        self.emit(LedgerEvent::payment_success(&done)).await;
        Ok(done)
    }

    /// Refunds a debited bill and fails it. Refunds at most once.
    async fn compensate(&self, tx: &Transaction, reason: String) -> Result<Transaction> {
        let token = Settlement::claim();
        match self
            .journal
            .transition_settlement(&tx.id, Settlement::Applied, token)
            .await
        {
            Ok(_) => {}
            Err(LedgerError::Conflict(_)) => return self.journal.find_by_id(&tx.id).await,
            Err(e) => return Err(e),
        }

        match self.wallets.credit_wallet(&tx.wallet_id, tx.amount).await {
            Ok(balance) => {
                self.journal
                    .transition_settlement(&tx.id, token, Settlement::Reversed)
                    .await?;
                let failed = self.fail(tx, reason).await?;
                info!(reference = %failed.reference, %balance, "bill payment failed, debit refunded");
                Ok(failed)
            }
            Err(e) => {
                if let Err(restore) = self
                    .journal
                    .transition_settlement(&tx.id, token, Settlement::Applied)
                    .await
                {
                    error!(reference = %tx.reference, error = %restore, "could not restore bill settlement");
                }
                let detail = format!(
                    "refund of {} to wallet {} failed after '{}': {}",
                    tx.amount, tx.wallet_id, reason, e
                );
                error!(reference = %tx.reference, %detail, "compensation failed");
                self.emit(LedgerEvent::rollback_required(tx, detail.clone()))
                    .await;
                Err(LedgerError::Inconsistent {
                    reference: tx.reference.clone(),
                    detail,
                })
            }
        }
    }

    async fn reverify_funding(&self, tx: Transaction) -> Result<Transaction> {
        match tx.settlement {
            Settlement::Applied => self.complete_funding(&tx).await,
            Settlement::Claimed { .. } | Settlement::Reversed => Ok(tx),
            Settlement::Unapplied => {
                match self.call_gateway(self.gateway.verify_payment(&tx.reference)).await {
                    Ok(verification) => self.settle_funding(tx, verification, true).await,
                    Err(GatewayError::Rejected(reason)) => self.fail(&tx, reason).await,
                    Err(GatewayError::Unavailable(reason)) => {
                        Err(LedgerError::GatewayUnavailable(reason))
                    }
                }
            }
        }
    }

    async fn reverify_bill(&self, tx: Transaction) -> Result<Transaction> {
        match tx.settlement {
            Settlement::Unapplied => self.fail(&tx, "bill amount was never debited").await,
            Settlement::Reversed => self.fail(&tx, "debit refunded").await,
            // Left to reconciliation.
            Settlement::Claimed { .. } => Ok(tx),
            Settlement::Applied => {
                match self
                    .call_gateway(self.gateway.bill_payment_status(&tx.reference))
                    .await
                {
                    Ok(receipt) => match receipt.status {
                        GatewayPaymentStatus::Success => {
                            self.confirm_bill(&tx, Some(receipt.transaction_id)).await
                        }
                        GatewayPaymentStatus::Pending => Ok(tx),
                        GatewayPaymentStatus::Failed | GatewayPaymentStatus::Abandoned => {
                            let reason =
                                format!("provider reported {:?}", receipt.status).to_lowercase();
                            self.compensate(&tx, reason).await
                        }
                    },
                    Err(GatewayError::Rejected(reason)) => self.compensate(&tx, reason).await,
                    Err(GatewayError::Unavailable(reason)) => {
                        Err(LedgerError::GatewayUnavailable(reason))
                    }
                }
            }
        }
    }
}

fn into_ledger_error(e: GatewayError) -> LedgerError {
    match e {
        GatewayError::Unavailable(reason) => LedgerError::GatewayUnavailable(reason),
        GatewayError::Rejected(reason) => LedgerError::GatewayRejected(reason),
    }
}
