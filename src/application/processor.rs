use crate::domain::event::TransactionEvent;
use crate::domain::ports::AccountStoreBox;
use crate::error::ProcessingError;
use tracing::{debug, warn};

/// Applies validated transaction events against the account store.
///
/// The processor owns the ledger side of a cycle: look the account up,
/// dispatch on the event kind, persist the updated balance. It reports
/// success or failure back to the worker and never touches the queue.
pub struct Processor {
    accounts: AccountStoreBox,
}

impl Processor {
    pub fn new(accounts: AccountStoreBox) -> Self {
        Self { accounts }
    }

    pub async fn apply(&self, event: &TransactionEvent) -> Result<(), ProcessingError> {
        let account_id = event.account_id();
        let mut account = self
            .accounts
            .get(account_id)
            .await?
            .ok_or(ProcessingError::AccountNotFound { account_id })?;

        match event {
            TransactionEvent::Debit { amount, .. } => account.debit(*amount),
            TransactionEvent::Credit { amount, .. } => account.credit(*amount),
            TransactionEvent::Info { .. } | TransactionEvent::Error { .. } => {
                // The dead-letter policy normally diverts these before they
                // reach the processor.
                warn!(
                    event_id = %event.id(),
                    kind = event.kind(),
                    "non-transactional event reached the processor; ignoring"
                );
                return Ok(());
            }
            TransactionEvent::Unsupported { kind, .. } => {
                return Err(ProcessingError::UnsupportedMessageType { kind: kind.clone() });
            }
        }

        debug!(
            event_id = %event.id(),
            account_id = %account_id,
            balance = %account.balance,
            "persisting updated balance"
        );
        self.accounts.store(account).await?;
        Ok(())
    }
}
