use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use transaction_worker::application::{Processor, Worker};
use transaction_worker::domain::account::{Balance, BankAccount};
use transaction_worker::domain::ports::AccountStore;
use transaction_worker::infrastructure::in_memory::{InMemoryAccountStore, InMemoryQueue};
use uuid::Uuid;

/// Builds a wire payload for a transactional event kind.
pub fn payload(kind: &str, account_id: Uuid, amount: &str) -> String {
    format!(
        r#"{{"id":"{}","messageType":"{kind}","bankAccountId":"{account_id}","amount":{amount}}}"#,
        Uuid::new_v4()
    )
}

/// Seeds an in-memory account store with the given balances.
pub async fn seeded_store(balances: &[(Uuid, Decimal)]) -> InMemoryAccountStore {
    let store = InMemoryAccountStore::new();
    for (id, balance) in balances {
        store
            .store(BankAccount::new(*id, Balance::new(*balance)))
            .await
            .unwrap();
    }
    store
}

/// Wires a worker over clones of the given queue and store.
pub fn worker(queue: &InMemoryQueue, store: &InMemoryAccountStore) -> Worker {
    Worker::new(
        Box::new(queue.clone()),
        Processor::new(Box::new(store.clone())),
        CancellationToken::new(),
    )
}

/// Balance currently held for `id`, panicking if the account is missing.
pub async fn balance_of(store: &InMemoryAccountStore, id: Uuid) -> Decimal {
    store.get(id).await.unwrap().unwrap().balance.0
}
