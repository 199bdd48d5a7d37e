//! Value types exchanged with an external payment gateway.

use super::money::Amount;
use super::transaction::Metadata;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a gateway adapter.
///
/// `Unavailable` covers timeouts and transport errors and may be retried;
/// `Rejected` is a definitive answer from the provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
    #[error("gateway rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayPaymentStatus {
    Pending,
    Success,
    Failed,
    Abandoned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInitRequest {
    pub amount: Amount,
    /// Who pays: the gateway identifies customers by this (e-mail for Paystack).
    pub payer_ref: String,
    pub reference: String,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInit {
    pub authorization_url: Option<String>,
    pub access_code: Option<String>,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub status: GatewayPaymentStatus,
    pub amount: Decimal,
    pub currency: String,
    pub reference: String,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillPaymentRequest {
    pub amount: Amount,
    pub bill_reference: String,
    pub provider: String,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillPaymentReceipt {
    pub transaction_id: String,
    pub status: GatewayPaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    pub name: String,
    pub code: String,
    pub active: bool,
    pub country: String,
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDetails {
    pub account_number: String,
    pub account_name: String,
    pub bank_code: String,
}
