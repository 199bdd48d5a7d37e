#![allow(dead_code)]

use rust_decimal::Decimal;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wallet_ledger::application::orchestrator::PaymentOrchestrator;
use wallet_ledger::config::EngineConfig;
use wallet_ledger::domain::money::Amount;
use wallet_ledger::domain::wallet::OwnerId;
use wallet_ledger::infrastructure::in_memory::{InMemoryTransactionStore, InMemoryWalletStore};
use wallet_ledger::infrastructure::mock_gateway::MockGateway;
use wallet_ledger::infrastructure::notifier::RecordingNotifier;

pub const HEADER: [&str; 7] = ["op", "owner", "amount", "reference", "bill", "provider", "currency"];

pub struct TestLedger {
    pub engine: Arc<PaymentOrchestrator>,
    pub gateway: Arc<MockGateway>,
    pub notifier: RecordingNotifier,
}

/// In-memory ledger with a short gateway timeout and no verify delay.
pub fn ledger(gateway: MockGateway) -> TestLedger {
    let gateway = Arc::new(gateway);
    let notifier = RecordingNotifier::new();
    let config = EngineConfig {
        gateway_timeout: Duration::from_millis(200),
        verify_after: Duration::ZERO,
        ..EngineConfig::default()
    };
    let engine = PaymentOrchestrator::from_stores(
        Box::new(InMemoryWalletStore::new()),
        Box::new(InMemoryTransactionStore::new()),
        gateway.clone(),
        Arc::new(notifier.clone()),
        &config,
    );
    TestLedger {
        engine: Arc::new(engine),
        gateway,
        notifier,
    }
}

pub fn amount(value: Decimal) -> Amount {
    Amount::new(value).unwrap()
}

/// Funds `owner` with `value` through the (succeeding) mock gateway.
pub async fn funded(ledger: &TestLedger, owner: &str, value: Decimal) -> OwnerId {
    let owner = OwnerId::new(owner);
    ledger
        .engine
        .fund(&owner, amount(value), &format!("SEED-{}", owner))
        .await
        .unwrap();
    owner
}

/// Writes `rows` fundings spread over `owners` wallets, each for 1.
pub fn generate_csv(path: &Path, owners: usize, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(HEADER)?;

    for i in 1..=rows {
        let owner = format!("user-{}", i % owners + 1);
        let reference = format!("FUND-{}", i);
        wtr.write_record([
            "fund",
            owner.as_str(),
            "1",
            reference.as_str(),
            "",
            "",
            "",
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
