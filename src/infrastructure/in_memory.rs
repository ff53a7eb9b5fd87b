use crate::domain::account::BankAccount;
use crate::domain::ports::{AccountStore, MessageQueue, QueuedMessage, ScheduleToken};
use crate::error::{StoreError, TransportError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// A dead-lettered message together with the reason it left rotation.
#[derive(Debug, Clone)]
pub struct DeadLetteredMessage {
    pub message: QueuedMessage,
    pub reason: String,
    pub description: String,
}

#[derive(Default)]
struct QueueInner {
    visible: VecDeque<QueuedMessage>,
    scheduled: HashMap<ScheduleToken, (DateTime<Utc>, QueuedMessage)>,
    dead_letters: Vec<DeadLetteredMessage>,
}

/// In-memory queue adapter with peek-lock-like semantics.
///
/// `peek` clones the head without removing it; acknowledge, abandon and
/// dead-letter match the peeked receipt. A receipt invalidated by an earlier
/// abandon or acknowledge is ignored, so the worker's trailing unconditional
/// acknowledge cannot consume a message that was just returned for
/// redelivery.
///
/// `Clone` shares the underlying state, which lets tests and the binary keep
/// a handle for inspection while the worker owns a boxed copy.
#[derive(Default, Clone)]
pub struct InMemoryQueue {
    inner: Arc<Mutex<QueueInner>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a raw payload as a fresh message.
    pub async fn push(&self, payload: impl Into<Vec<u8>>) {
        self.push_with_attempts(payload, 0).await;
    }

    /// Enqueues a message that has already been through `attempts`
    /// redeliveries.
    pub async fn push_with_attempts(&self, payload: impl Into<Vec<u8>>, attempts: u32) {
        let mut inner = self.inner.lock().await;
        inner.visible.push_back(QueuedMessage {
            payload: payload.into(),
            delivery_attempts: attempts,
            receipt: Uuid::new_v4(),
        });
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.visible.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.visible.is_empty()
    }

    pub async fn dead_letters(&self) -> Vec<DeadLetteredMessage> {
        self.inner.lock().await.dead_letters.clone()
    }

    pub async fn scheduled_count(&self) -> usize {
        self.inner.lock().await.scheduled.len()
    }
}

#[async_trait]
impl MessageQueue for InMemoryQueue {
    async fn peek(&self) -> Result<Option<QueuedMessage>, TransportError> {
        let mut inner = self.inner.lock().await;

        // Promote scheduled copies that have come due.
        let now = Utc::now();
        let due: Vec<ScheduleToken> = inner
            .scheduled
            .iter()
            .filter(|(_, (visible_at, _))| *visible_at <= now)
            .map(|(token, _)| *token)
            .collect();
        for token in due {
            if let Some((_, copy)) = inner.scheduled.remove(&token) {
                inner.visible.push_back(copy);
            }
        }

        Ok(inner.visible.front().cloned())
    }

    async fn acknowledge(&self, msg: &QueuedMessage) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().await;
        // Stale receipts are ignored.
        inner.visible.retain(|m| m.receipt != msg.receipt);
        Ok(())
    }

    async fn abandon(&self, msg: &QueuedMessage) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().await;
        if let Some(pos) = inner.visible.iter().position(|m| m.receipt == msg.receipt)
            && let Some(mut redelivered) = inner.visible.remove(pos)
        {
            redelivered.delivery_attempts += 1;
            redelivered.receipt = Uuid::new_v4();
            inner.visible.push_back(redelivered);
        }
        Ok(())
    }

    async fn dead_letter(
        &self,
        msg: &QueuedMessage,
        reason: &str,
        description: &str,
    ) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().await;
        if let Some(pos) = inner.visible.iter().position(|m| m.receipt == msg.receipt)
            && let Some(message) = inner.visible.remove(pos)
        {
            inner.dead_letters.push(DeadLetteredMessage {
                message,
                reason: reason.to_owned(),
                description: description.to_owned(),
            });
        }
        Ok(())
    }

    async fn schedule_after(
        &self,
        msg: &QueuedMessage,
        visible_at: DateTime<Utc>,
    ) -> Result<ScheduleToken, TransportError> {
        let mut inner = self.inner.lock().await;
        let token = ScheduleToken(Uuid::new_v4());
        let copy = QueuedMessage {
            payload: msg.payload.clone(),
            delivery_attempts: msg.delivery_attempts,
            receipt: Uuid::new_v4(),
        };
        inner.scheduled.insert(token, (visible_at, copy));
        Ok(token)
    }

    async fn cancel_scheduled(&self, token: ScheduleToken) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().await;
        // A token that already fired (or was never issued) is not an error.
        inner.scheduled.remove(&token);
        Ok(())
    }
}

/// A thread-safe in-memory store for bank accounts.
///
/// `Clone` shares the underlying map, so the binary can seed accounts and
/// read final balances while the processor owns a boxed copy.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<Uuid, BankAccount>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get(&self, account_id: Uuid) -> Result<Option<BankAccount>, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&account_id).cloned())
    }

    async fn store(&self, account: BankAccount) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.id, account);
        Ok(())
    }

    async fn all_accounts(&self) -> Result<Vec<BankAccount>, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().cloned().collect())
    }
}
