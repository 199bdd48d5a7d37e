use crate::config::PaystackConfig;
use crate::domain::gateway::{
    AccountDetails, Bank, BillPaymentReceipt, BillPaymentRequest, GatewayError,
    GatewayPaymentStatus, PaymentInit, PaymentInitRequest, PaymentVerification,
};
use crate::domain::ports::PaymentGateway;
use crate::domain::transaction::Metadata;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Paystack envelope: every endpoint answers `{status, message, data}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    message: String,
    data: Option<T>,
}

#[derive(Debug, Serialize)]
struct InitializeBody<'a> {
    amount: i64,
    email: &'a str,
    reference: &'a str,
    metadata: &'a Metadata,
}

#[derive(Debug, Deserialize)]
struct InitializeData {
    authorization_url: Option<String>,
    access_code: Option<String>,
    reference: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    amount: i64,
    currency: String,
    reference: String,
    paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ResolveData {
    account_number: String,
    account_name: String,
}

/// HTTP adapter for the Paystack API.
///
/// Amounts are whole minor units (kobo for NGN). Paystack has no bill
/// endpoint, so bill payments are always rejected.
#[derive(Clone)]
pub struct PaystackGateway {
    client: Client,
    config: PaystackConfig,
}

impl PaystackGateway {
    pub fn new(config: PaystackConfig, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let response = request
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(GatewayError::Unavailable(format!("paystack answered {}", status)));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("unreadable paystack response: {}", e)))?;
        debug!(http_status = %status, ok = envelope.status, message = %envelope.message, "paystack response");

        if !status.is_success() || !envelope.status {
            return Err(GatewayError::Rejected(envelope.message));
        }
        envelope
            .data
            .ok_or_else(|| GatewayError::Rejected(format!("{} (no data)", envelope.message)))
    }
}

fn minor_units(amount: Decimal) -> Result<i64, GatewayError> {
    if !amount.fract().is_zero() {
        return Err(GatewayError::Rejected(format!(
            "amount {} is not a whole number of minor units",
            amount
        )));
    }
    i64::try_from(amount).map_err(|e| GatewayError::Rejected(e.to_string()))
}

fn payment_status(status: &str) -> GatewayPaymentStatus {
    match status {
        "success" => GatewayPaymentStatus::Success,
        "failed" | "reversed" => GatewayPaymentStatus::Failed,
        "abandoned" => GatewayPaymentStatus::Abandoned,
        _ => GatewayPaymentStatus::Pending,
    }
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    async fn initialize_payment(
        &self,
        request: PaymentInitRequest,
    ) -> Result<PaymentInit, GatewayError> {
        let body = InitializeBody {
            amount: minor_units(request.amount.value())?,
            email: &request.payer_ref,
            reference: &request.reference,
            metadata: &request.metadata,
        };
        let data: InitializeData = self
            .send(self.client.post(self.url("/transaction/initialize")).json(&body))
            .await?;
        Ok(PaymentInit {
            authorization_url: data.authorization_url,
            access_code: data.access_code,
            reference: data.reference,
        })
    }

    async fn verify_payment(&self, reference: &str) -> Result<PaymentVerification, GatewayError> {
        let data: VerifyData = self
            .send(
                self.client
                    .get(self.url(&format!("/transaction/verify/{}", reference))),
            )
            .await?;
        Ok(PaymentVerification {
            status: payment_status(&data.status),
            amount: Decimal::from(data.amount),
            currency: data.currency,
            reference: data.reference,
            paid_at: data.paid_at,
        })
    }

    async fn process_bill_payment(
        &self,
        request: BillPaymentRequest,
    ) -> Result<BillPaymentReceipt, GatewayError> {
        Err(GatewayError::Rejected(format!(
            "paystack does not process {} bills",
            request.provider
        )))
    }

    async fn bill_payment_status(&self, reference: &str) -> Result<BillPaymentReceipt, GatewayError> {
        // No bill was ever accepted here; leave the record to reconciliation.
        Err(GatewayError::Unavailable(format!(
            "paystack has no status for bill {}",
            reference
        )))
    }

    async fn banks(&self) -> Result<Vec<Bank>, GatewayError> {
        self.send(self.client.get(self.url("/bank"))).await
    }

    async fn resolve_account(
        &self,
        account_number: &str,
        bank_code: &str,
    ) -> Result<AccountDetails, GatewayError> {
        let data: ResolveData = self
            .send(self.client.get(self.url("/bank/resolve")).query(&[
                ("account_number", account_number),
                ("bank_code", bank_code),
            ]))
            .await?;
        Ok(AccountDetails {
            account_number: data.account_number,
            account_name: data.account_name,
            bank_code: bank_code.to_string(),
        })
    }
}
