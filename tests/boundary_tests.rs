use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use rust_decimal::Decimal;
use std::process::Command;
use wallet_ledger::domain::money::Balance;
use wallet_ledger::domain::transaction::TransactionStatus;
use wallet_ledger::domain::wallet::OwnerId;
use wallet_ledger::error::LedgerError;
use wallet_ledger::infrastructure::mock_gateway::MockGateway;

mod common;

#[test]
fn test_boundary_numerical_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boundary.csv");
    let mut wtr = csv::Writer::from_path(&path).unwrap();
    wtr.write_record(common::HEADER).unwrap();

    wtr.write_record(["fund", "whale", "1000000000000.0000", "F-1", "", "", ""])
        .unwrap();
    // Exactly drains the wallet
    wtr.write_record([
        "pay_bill",
        "whale",
        "1000000000000",
        "B-1",
        "M-1",
        "provider-A",
        "",
    ])
    .unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("wallet-ledger"));
    cmd.arg(&path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(",0,NGN,true"));
}

#[test]
fn test_extreme_decimal_precision() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("precision.csv");
    let mut wtr = csv::Writer::from_path(&path).unwrap();
    wtr.write_record(common::HEADER).unwrap();

    wtr.write_record(["fund", "alice", "0.0001", "F-1", "", "", ""]).unwrap();
    wtr.write_record(["fund", "alice", "0.0001", "F-2", "", "", ""]).unwrap();
    wtr.write_record(["pay_bill", "alice", "0.00015", "B-1", "M-1", "provider-A", ""])
        .unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("wallet-ledger"));
    cmd.arg(&path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(",0.00005,NGN,true"));
}

#[tokio::test]
async fn test_balance_overflow_is_refused() {
    let ledger = common::ledger(MockGateway::new());
    let whale = OwnerId::new("whale");
    let max = common::amount(Decimal::MAX);

    ledger.engine.fund(&whale, max, "F-MAX-1").await.unwrap();
    let err = ledger.engine.fund(&whale, max, "F-MAX-2").await.unwrap_err();

    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(
        ledger.engine.get_balance(&whale).await.unwrap(),
        Balance::new(Decimal::MAX)
    );
    let tx = ledger.engine.transaction("F-MAX-2").await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Pending);
}
