use crate::domain::money::Currency;
use crate::error::{LedgerError, Result};
use std::time::Duration;

pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_VERIFY_AFTER: Duration = Duration::from_secs(60);
pub const PAYSTACK_BASE_URL: &str = "https://api.paystack.co";

/// Credentials for the Paystack gateway adapter.
#[derive(Clone, PartialEq, Eq)]
pub struct PaystackConfig {
    pub secret_key: String,
    pub base_url: String,
}

impl PaystackConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            base_url: PAYSTACK_BASE_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for PaystackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaystackConfig")
            .field("secret_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Engine settings, built once at start-up and handed to constructors.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Currency given to wallets created implicitly on first funding.
    pub default_currency: Currency,
    /// Upper bound on every gateway call.
    pub gateway_timeout: Duration,
    /// How long a pending transaction is left alone before `verify` re-queries
    /// the gateway. Should not be shorter than `gateway_timeout`.
    pub verify_after: Duration,
    pub paystack: Option<PaystackConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_currency: Currency::default(),
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
            verify_after: DEFAULT_VERIFY_AFTER,
            paystack: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.gateway_timeout.is_zero() {
            return Err(LedgerError::Validation(
                "Gateway timeout must be greater than zero".into(),
            ));
        }
        if let Some(paystack) = &self.paystack
            && paystack.secret_key.trim().is_empty()
        {
            return Err(LedgerError::Validation(
                "Paystack secret key must not be empty".into(),
            ));
        }
        Ok(())
    }
}
