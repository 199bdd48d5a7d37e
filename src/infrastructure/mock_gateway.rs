use crate::domain::gateway::{
    AccountDetails, Bank, BillPaymentReceipt, BillPaymentRequest, GatewayError,
    GatewayPaymentStatus, PaymentInit, PaymentInitRequest, PaymentVerification,
};
use crate::domain::ports::PaymentGateway;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// How a mocked gateway operation answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockBehavior {
    #[default]
    Succeed,
    /// Definitive refusal from the provider.
    Reject,
    /// Transport-level failure.
    Unavailable,
    /// The provider has not settled yet.
    Pending,
    /// Never answers within any sane timeout.
    Stall,
}

const STALL: Duration = Duration::from_secs(3600);

/// An in-process payment gateway with scriptable answers.
///
/// Amounts passed to `initialize_payment` and `process_bill_payment` are
/// remembered by reference so `verify_payment` can report them back. Bill
/// receipts are kept the same way for `bill_payment_status`, which answers
/// with its own behavior so a pending bill can settle later.
#[derive(Debug, Default)]
pub struct MockGateway {
    initialize: RwLock<MockBehavior>,
    verify: RwLock<MockBehavior>,
    bills: RwLock<MockBehavior>,
    bill_status: RwLock<MockBehavior>,
    amounts: RwLock<HashMap<String, Decimal>>,
    bill_receipts: RwLock<HashMap<String, String>>,
    initialize_calls: AtomicUsize,
    verify_calls: AtomicUsize,
    bill_calls: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initialize(mut self, behavior: MockBehavior) -> Self {
        self.initialize = RwLock::new(behavior);
        self
    }

    pub fn with_verify(mut self, behavior: MockBehavior) -> Self {
        self.verify = RwLock::new(behavior);
        self
    }

    pub fn with_bills(mut self, behavior: MockBehavior) -> Self {
        self.bills = RwLock::new(behavior);
        self
    }

    pub fn with_bill_status(mut self, behavior: MockBehavior) -> Self {
        self.bill_status = RwLock::new(behavior);
        self
    }

    pub async fn set_initialize(&self, behavior: MockBehavior) {
        *self.initialize.write().await = behavior;
    }

    pub async fn set_verify(&self, behavior: MockBehavior) {
        *self.verify.write().await = behavior;
    }

    pub async fn set_bills(&self, behavior: MockBehavior) {
        *self.bills.write().await = behavior;
    }

    pub async fn set_bill_status(&self, behavior: MockBehavior) {
        *self.bill_status.write().await = behavior;
    }

    pub fn initialize_calls(&self) -> usize {
        self.initialize_calls.load(Ordering::SeqCst)
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn bill_calls(&self) -> usize {
        self.bill_calls.load(Ordering::SeqCst)
    }

    async fn remember(&self, reference: &str, amount: Decimal) {
        self.amounts
            .write()
            .await
            .insert(reference.to_string(), amount);
    }
}

async fn stall() -> GatewayError {
    tokio::time::sleep(STALL).await;
    GatewayError::Unavailable("mock gateway stalled".into())
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn initialize_payment(
        &self,
        request: PaymentInitRequest,
    ) -> Result<PaymentInit, GatewayError> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = *self.initialize.read().await;
        match behavior {
            MockBehavior::Succeed | MockBehavior::Pending => {
                self.remember(&request.reference, request.amount.value()).await;
                Ok(PaymentInit {
                    authorization_url: Some(format!(
                        "https://mockpay.test/authorize/{}",
                        request.reference
                    )),
                    access_code: Some("mock-access".into()),
                    reference: request.reference,
                })
            }
            MockBehavior::Reject => Err(GatewayError::Rejected("payer declined".into())),
            MockBehavior::Unavailable => Err(GatewayError::Unavailable("connection refused".into())),
            MockBehavior::Stall => Err(stall().await),
        }
    }

    async fn verify_payment(&self, reference: &str) -> Result<PaymentVerification, GatewayError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = *self.verify.read().await;
        let status = match behavior {
            MockBehavior::Succeed => GatewayPaymentStatus::Success,
            MockBehavior::Reject => GatewayPaymentStatus::Failed,
            MockBehavior::Pending => GatewayPaymentStatus::Pending,
            MockBehavior::Unavailable => {
                return Err(GatewayError::Unavailable("connection refused".into()));
            }
            MockBehavior::Stall => return Err(stall().await),
        };
        let amount = self
            .amounts
            .read()
            .await
            .get(reference)
            .copied()
            .ok_or_else(|| GatewayError::Rejected(format!("unknown reference {}", reference)))?;

        Ok(PaymentVerification {
            status,
            amount,
            currency: "NGN".into(),
            reference: reference.to_string(),
            paid_at: (status == GatewayPaymentStatus::Success).then(Utc::now),
        })
    }

    async fn process_bill_payment(
        &self,
        request: BillPaymentRequest,
    ) -> Result<BillPaymentReceipt, GatewayError> {
        let call = self.bill_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let behavior = *self.bills.read().await;
        let status = match behavior {
            MockBehavior::Succeed => GatewayPaymentStatus::Success,
            MockBehavior::Pending => GatewayPaymentStatus::Pending,
            MockBehavior::Reject => {
                return Err(GatewayError::Rejected(format!(
                    "{} declined bill {}",
                    request.provider, request.bill_reference
                )));
            }
            MockBehavior::Unavailable => {
                return Err(GatewayError::Unavailable("connection refused".into()));
            }
            MockBehavior::Stall => return Err(stall().await),
        };

        let key = request
            .metadata
            .get("reference")
            .and_then(|v| v.as_str())
            .unwrap_or(request.bill_reference.as_str())
            .to_string();
        let transaction_id = format!("MOCK-BILL-{}", call);
        self.remember(&key, request.amount.value()).await;
        self.bill_receipts
            .write()
            .await
            .insert(key, transaction_id.clone());

        Ok(BillPaymentReceipt {
            transaction_id,
            status,
        })
    }

    async fn bill_payment_status(&self, reference: &str) -> Result<BillPaymentReceipt, GatewayError> {
        let behavior = *self.bill_status.read().await;
        let status = match behavior {
            MockBehavior::Succeed => GatewayPaymentStatus::Success,
            MockBehavior::Reject => GatewayPaymentStatus::Failed,
            MockBehavior::Pending => GatewayPaymentStatus::Pending,
            MockBehavior::Unavailable => {
                return Err(GatewayError::Unavailable("connection refused".into()));
            }
            MockBehavior::Stall => return Err(stall().await),
        };
        let transaction_id = self
            .bill_receipts
            .read()
            .await
            .get(reference)
            .cloned()
            .ok_or_else(|| GatewayError::Rejected(format!("unknown bill {}", reference)))?;

        Ok(BillPaymentReceipt {
            transaction_id,
            status,
        })
    }

    async fn banks(&self) -> Result<Vec<Bank>, GatewayError> {
        Ok(vec![Bank {
            name: "Mock Bank".into(),
            code: "999".into(),
            active: true,
            country: "Nigeria".into(),
            currency: "NGN".into(),
            kind: "nuban".into(),
        }])
    }

    async fn resolve_account(
        &self,
        account_number: &str,
        bank_code: &str,
    ) -> Result<AccountDetails, GatewayError> {
        if account_number.len() != 10 || !account_number.chars().all(|c| c.is_ascii_digit()) {
            return Err(GatewayError::Rejected(format!(
                "Could not resolve account {}",
                account_number
            )));
        }
        Ok(AccountDetails {
            account_number: account_number.to_string(),
            account_name: "MOCK ACCOUNT HOLDER".into(),
            bank_code: bank_code.to_string(),
        })
    }
}
