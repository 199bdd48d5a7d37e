use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn commands(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op,owner,amount,reference,bill,provider,currency").unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

#[test]
fn test_bill_gateway_failure_is_refunded() {
    let file = commands(&[
        "fund,W2,1000,FUND-W2,,,",
        "pay_bill,W2,300,BILL-3,METER-2,provider-B,",
    ]);

    let mut cmd = Command::new(cargo_bin!("wallet-ledger"));
    cmd.arg(file.path()).arg("--mock-bills").arg("reject");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(",1000,NGN,true"))
        .stderr(predicate::str::contains("command failed"));
}

#[test]
fn test_bill_gateway_timeout_is_refunded() {
    let file = commands(&[
        "fund,W2,1000,FUND-W2,,,",
        "pay_bill,W2,300,BILL-3,METER-2,provider-B,",
    ]);

    let mut cmd = Command::new(cargo_bin!("wallet-ledger"));
    cmd.arg(file.path())
        .arg("--mock-bills")
        .arg("stall")
        .arg("--gateway-timeout-ms")
        .arg("100");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(",1000,NGN,true"));
}

#[test]
fn test_pending_bill_settles_on_verify() {
    let file = commands(&[
        "fund,W1,1000,FUND-W1,,,",
        "pay_bill,W1,250,BILL-7,METER-1,provider-A,",
        "verify,,,BILL-7,,,",
    ]);

    let mut cmd = Command::new(cargo_bin!("wallet-ledger"));
    cmd.arg(file.path())
        .arg("--mock-bills")
        .arg("pending")
        .arg("--verify-after-secs")
        .arg("0")
        .arg("--log-level")
        .arg("info");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(",750,NGN,true"))
        .stderr(predicate::str::contains("bill paid"));
}

#[test]
fn test_pending_funding_is_credited_once() {
    let file = commands(&[
        "fund,W1,500,FUND-P,,,",
        "verify,,,FUND-P,,,",
        "fund,W1,500,FUND-P,,,",
    ]);

    let mut cmd = Command::new(cargo_bin!("wallet-ledger"));
    cmd.arg(file.path())
        .arg("--mock-funding")
        .arg("pending")
        .arg("--verify-after-secs")
        .arg("0");

    // The mock keeps answering "pending", so nothing is credited.
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(",0,NGN,true"))
        .stderr(predicate::str::contains("funding pending"));
}
