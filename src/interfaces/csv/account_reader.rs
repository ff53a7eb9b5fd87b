use crate::domain::account::{Balance, BankAccount};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct AccountRecord {
    id: Uuid,
    balance: Decimal,
}

/// Reads seed accounts from a CSV source with an `id,balance` header.
pub struct AccountReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> AccountReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes accounts.
    pub fn accounts(self) -> impl Iterator<Item = csv::Result<BankAccount>> {
        self.reader
            .into_deserialize::<AccountRecord>()
            .map(|result| {
                result.map(|record| BankAccount::new(record.id, Balance::new(record.balance)))
            })
    }
}
