use crate::domain::account::BankAccount;
use std::io::Write;

/// Writes final account balances as CSV (`id,balance`), sorted by account id
/// for stable output.
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(target: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(target),
        }
    }

    pub fn write_accounts(&mut self, mut accounts: Vec<BankAccount>) -> csv::Result<()> {
        accounts.sort_by_key(|account| account.id);

        self.writer.write_record(["id", "balance"])?;
        for account in accounts {
            self.writer
                .write_record([account.id.to_string(), account.balance.to_string()])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
