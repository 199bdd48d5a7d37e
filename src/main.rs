use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use wallet_ledger::application::orchestrator::PaymentOrchestrator;
use wallet_ledger::config::{EngineConfig, PaystackConfig};
use wallet_ledger::domain::money::Currency;
use wallet_ledger::domain::ports::{PaymentGatewayRef, TransactionStoreBox, WalletStoreBox};
use wallet_ledger::infrastructure::in_memory::{InMemoryTransactionStore, InMemoryWalletStore};
use wallet_ledger::infrastructure::mock_gateway::{MockBehavior, MockGateway};
use wallet_ledger::infrastructure::notifier::TracingNotifier;
use wallet_ledger::interfaces::csv::command_reader::{Command, CommandReader};
use wallet_ledger::interfaces::csv::wallet_writer::WalletWriter;
use wallet_ledger::telemetry;

/// Scripted answer of the built-in mock gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MockMode {
    Succeed,
    Reject,
    Unavailable,
    Pending,
    Stall,
}

impl From<MockMode> for MockBehavior {
    fn from(mode: MockMode) -> Self {
        match mode {
            MockMode::Succeed => MockBehavior::Succeed,
            MockMode::Reject => MockBehavior::Reject,
            MockMode::Unavailable => MockBehavior::Unavailable,
            MockMode::Pending => MockBehavior::Pending,
            MockMode::Stall => MockBehavior::Stall,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Currency for wallets created on first funding
    #[arg(long, default_value = "NGN")]
    default_currency: String,

    /// Upper bound on each gateway call, in milliseconds
    #[arg(long, default_value_t = 30_000)]
    gateway_timeout_ms: u64,

    /// Age after which `verify` re-queries the gateway for a pending transaction
    #[arg(long, default_value_t = 60)]
    verify_after_secs: u64,

    /// How the mock gateway answers funding verification
    #[arg(long, value_enum, default_value_t = MockMode::Succeed)]
    mock_funding: MockMode,

    /// How the mock gateway answers bill payments
    #[arg(long, value_enum, default_value_t = MockMode::Succeed)]
    mock_bills: MockMode,

    /// Use Paystack instead of the mock gateway
    #[arg(long, env = "PAYSTACK_SECRET_KEY", hide_env_values = true)]
    paystack_secret_key: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn engine_config(&self) -> Result<EngineConfig> {
        let config = EngineConfig {
            default_currency: Currency::new(&self.default_currency).into_diagnostic()?,
            gateway_timeout: Duration::from_millis(self.gateway_timeout_ms),
            verify_after: Duration::from_secs(self.verify_after_secs),
            paystack: self.paystack_secret_key.clone().map(PaystackConfig::new),
        };
        config.validate().into_diagnostic()?;
        Ok(config)
    }

    fn gateway(&self, config: &EngineConfig) -> PaymentGatewayRef {
        #[cfg(feature = "gateway-paystack")]
        {
            use wallet_ledger::infrastructure::paystack::PaystackGateway;

            if let Some(paystack) = &config.paystack {
                info!(base_url = %paystack.base_url, "using paystack gateway");
                return Arc::new(PaystackGateway::new(
                    paystack.clone(),
                    config.gateway_timeout,
                ));
            }
        }
        #[cfg(not(feature = "gateway-paystack"))]
        {
            if config.paystack.is_some() {
                warn!("built without gateway-paystack, ignoring paystack secret key");
            }
        }

        Arc::new(
            MockGateway::new()
                .with_verify(self.mock_funding.into())
                .with_bills(self.mock_bills.into()),
        )
    }
}

fn in_memory_stores() -> (WalletStoreBox, TransactionStoreBox) {
    (
        Box::new(InMemoryWalletStore::new()),
        Box::new(InMemoryTransactionStore::new()),
    )
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<&Path>) -> Result<(WalletStoreBox, TransactionStoreBox)> {
    use wallet_ledger::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok((Box::new(store.clone()), Box::new(store)))
        }
        None => Ok(in_memory_stores()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<&Path>) -> Result<(WalletStoreBox, TransactionStoreBox)> {
    if let Some(path) = db_path {
        warn!(
            path = %path.display(),
            "built without storage-rocksdb, falling back to in-memory storage"
        );
    }
    Ok(in_memory_stores())
}

async fn execute(
    engine: &PaymentOrchestrator,
    command: Command,
) -> wallet_ledger::error::Result<()> {
    match command {
        Command::Fund {
            owner,
            amount,
            reference,
        } => {
            let outcome = engine.fund(&owner, amount, &reference).await?;
            if outcome.is_pending() {
                warn!(%reference, "funding pending, verify later");
            }
        }
        Command::PayBill(order) => {
            let outcome = engine.pay_bill(order).await?;
            if outcome.is_pending() {
                warn!(reference = %outcome.transaction.reference, "bill payment pending");
            }
        }
        Command::Verify { reference } => {
            let tx = engine.verify(&reference).await?;
            info!(%reference, status = ?tx.status, "verified");
        }
        Command::Provision { owner, currency } => {
            engine.provision_wallet(&owner, currency).await?;
        }
        Command::Deactivate { owner } => {
            engine.deactivate_wallet(&owner).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level);

    let config = cli.engine_config()?;
    let (wallet_store, transaction_store) = open_stores(cli.db_path.as_deref())?;
    let engine = PaymentOrchestrator::from_stores(
        wallet_store,
        transaction_store,
        cli.gateway(&config),
        Arc::new(TracingNotifier),
        &config,
    );

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for (index, command) in reader.commands().enumerate() {
        // Row numbers count the header line.
        let row = index + 2;
        match command {
            Ok(command) => {
                if let Err(e) = execute(&engine, command).await {
                    warn!(row, error = %e, "command failed");
                }
            }
            Err(e) => warn!(row, error = %e, "skipping unreadable command"),
        }
    }

    let wallets = engine.wallets().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = WalletWriter::new(stdout.lock());
    writer.write_wallets(&wallets).into_diagnostic()?;

    Ok(())
}
