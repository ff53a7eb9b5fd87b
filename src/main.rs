use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;
use transaction_worker::application::{Processor, Worker};
use transaction_worker::domain::ports::AccountStore;
use transaction_worker::infrastructure::in_memory::{InMemoryAccountStore, InMemoryQueue};
use transaction_worker::interfaces::csv::account_reader::AccountReader;
use transaction_worker::interfaces::csv::account_writer::AccountWriter;

/// Replays a batch of queued transaction messages against the account store
/// and prints the final balances as CSV.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file with one raw message payload per line
    messages: PathBuf,

    /// CSV file seeding the account store (`id,balance` with a header row)
    #[arg(long)]
    accounts: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let store = InMemoryAccountStore::new();
    let seed = File::open(&cli.accounts).into_diagnostic()?;
    let mut seeded = 0usize;
    for record in AccountReader::new(seed).accounts() {
        let account = record.into_diagnostic()?;
        store.store(account).await.into_diagnostic()?;
        seeded += 1;
    }
    info!(accounts = seeded, "account store seeded");

    let queue = InMemoryQueue::new();
    let payloads = std::fs::read_to_string(&cli.messages).into_diagnostic()?;
    let mut enqueued = 0usize;
    for line in payloads.lines() {
        if line.trim().is_empty() {
            continue;
        }
        queue.push(line.as_bytes().to_vec()).await;
        enqueued += 1;
    }
    info!(messages = enqueued, "queue loaded");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    let processor = Processor::new(Box::new(store.clone()));
    let mut worker = Worker::new(Box::new(queue.clone()), processor, shutdown);
    worker.run().await.into_diagnostic()?;

    let accounts = store.all_accounts().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = AccountWriter::new(stdout.lock());
    writer.write_accounts(accounts).into_diagnostic()?;

    Ok(())
}
