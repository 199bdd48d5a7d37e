use crate::domain::wallet::Wallet;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct WalletRow<'a> {
    owner: &'a str,
    wallet: String,
    balance: String,
    currency: &'a str,
    active: bool,
}

impl<'a> From<&'a Wallet> for WalletRow<'a> {
    fn from(wallet: &'a Wallet) -> Self {
        Self {
            owner: wallet.owner_id.as_str(),
            wallet: wallet.id.to_string(),
            balance: wallet.balance.to_string(),
            currency: wallet.currency.code(),
            active: wallet.active,
        }
    }
}

/// Writes the final wallet table as `owner,wallet,balance,currency,active`.
pub struct WalletWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> WalletWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_wallets(&mut self, wallets: &[Wallet]) -> Result<()> {
        if wallets.is_empty() {
            self.writer
                .write_record(["owner", "wallet", "balance", "currency", "active"])?;
        }
        for wallet in wallets {
            self.writer.serialize(WalletRow::from(wallet))?;
        }
        self.writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::{Balance, Currency};
    use crate::domain::wallet::OwnerId;
    use rust_decimal_macros::dec;

    fn render(wallets: &[Wallet]) -> String {
        let mut buffer = Vec::new();
        WalletWriter::new(&mut buffer).write_wallets(wallets).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_writes_header_and_rows() {
        let mut wallet = Wallet::new(OwnerId::new("alice"), Currency::default());
        wallet.balance = Balance::new(dec!(400.00));

        let output = render(std::slice::from_ref(&wallet));
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("owner,wallet,balance,currency,active"));
        assert_eq!(
            lines.next(),
            Some(format!("alice,{},400,NGN,true", wallet.id).as_str())
        );
    }

    #[test]
    fn test_empty_table_still_has_header() {
        assert_eq!(render(&[]), "owner,wallet,balance,currency,active\n");
    }
}
