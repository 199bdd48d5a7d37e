use crate::application::orchestrator::BillPaymentOrder;
use crate::domain::money::{Amount, Currency};
use crate::domain::wallet::OwnerId;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Fund,
    PayBill,
    Verify,
    Provision,
    Deactivate,
}

/// One CSV row as written: `op, owner, amount, reference, bill, provider, currency`.
/// Columns an operation does not use may be empty or missing.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CommandRecord {
    pub op: Operation,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub bill: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// A validated command, ready for the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Fund {
        owner: OwnerId,
        amount: Amount,
        reference: String,
    },
    PayBill(BillPaymentOrder),
    Verify {
        reference: String,
    },
    Provision {
        owner: OwnerId,
        currency: Currency,
    },
    Deactivate {
        owner: OwnerId,
    },
}

fn required(value: Option<String>, column: &str, op: Operation) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| LedgerError::Validation(format!("{:?} requires a {} column", op, column)))
}

impl TryFrom<CommandRecord> for Command {
    type Error = LedgerError;

    fn try_from(record: CommandRecord) -> Result<Self> {
        let op = record.op;
        let amount = || -> Result<Amount> {
            let value = record
                .amount
                .ok_or_else(|| LedgerError::Validation(format!("{:?} requires an amount", op)))?;
            Amount::new(value)
        };

        match op {
            Operation::Fund => Ok(Command::Fund {
                amount: amount()?,
                owner: OwnerId::new(required(record.owner, "owner", op)?),
                reference: required(record.reference, "reference", op)?,
            }),
            Operation::PayBill => {
                let mut order = BillPaymentOrder::new(
                    OwnerId::new(required(record.owner, "owner", op)?),
                    amount()?,
                    required(record.bill, "bill", op)?,
                    required(record.provider, "provider", op)?,
                );
                if let Some(reference) = record.reference.filter(|r| !r.is_empty()) {
                    order = order.with_reference(reference);
                }
                Ok(Command::PayBill(order))
            }
            Operation::Verify => Ok(Command::Verify {
                reference: required(record.reference, "reference", op)?,
            }),
            Operation::Provision => Ok(Command::Provision {
                owner: OwnerId::new(required(record.owner, "owner", op)?),
                currency: match record.currency.filter(|c| !c.is_empty()) {
                    Some(code) => Currency::new(&code)?,
                    None => Currency::default(),
                },
            }),
            Operation::Deactivate => Ok(Command::Deactivate {
                owner: OwnerId::new(required(record.owner, "owner", op)?),
            }),
        }
    }
}

/// Reads ledger commands from a CSV source, one per row, lazily.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// A malformed row yields an error for that row only; the stream goes on.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize::<CommandRecord>()
            .map(|result| result.map_err(LedgerError::from).and_then(Command::try_from))
    }
}
