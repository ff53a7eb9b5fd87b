use crate::domain::account::BankAccount;
use crate::error::{StoreError, TransportError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// An opaque message envelope owned by the queue.
///
/// The payload is raw bytes; `receipt` identifies this particular delivery
/// for acknowledge/abandon/dead-letter/schedule calls. The worker never
/// mutates the envelope directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub payload: Vec<u8>,
    pub delivery_attempts: u32,
    pub receipt: Uuid,
}

/// Handle for a scheduled redelivery, consumed by `cancel_scheduled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleToken(pub Uuid);

/// Gateway to the message queue.
///
/// All operations suspend on I/O. Failures are infrastructure faults and
/// propagate to the caller uncaught.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Non-destructive read of the next visible message, if any.
    async fn peek(&self) -> Result<Option<QueuedMessage>, TransportError>;

    /// Marks the message permanently consumed and removes it from the queue.
    async fn acknowledge(&self, msg: &QueuedMessage) -> Result<(), TransportError>;

    /// Returns the message to the queue for redelivery, incrementing its
    /// delivery-attempt counter.
    async fn abandon(&self, msg: &QueuedMessage) -> Result<(), TransportError>;

    /// Moves the message to the terminal dead-letter queue; it is never
    /// redelivered.
    async fn dead_letter(
        &self,
        msg: &QueuedMessage,
        reason: &str,
        description: &str,
    ) -> Result<(), TransportError>;

    /// Registers a copy of the message that becomes visible for redelivery
    /// at `visible_at`.
    async fn schedule_after(
        &self,
        msg: &QueuedMessage,
        visible_at: DateTime<Utc>,
    ) -> Result<ScheduleToken, TransportError>;

    /// Cancels a previously scheduled copy. Tokens that already fired are
    /// ignored.
    async fn cancel_scheduled(&self, token: ScheduleToken) -> Result<(), TransportError>;
}

/// Lookup and persistence of account balances.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get(&self, account_id: Uuid) -> Result<Option<BankAccount>, StoreError>;
    async fn store(&self, account: BankAccount) -> Result<(), StoreError>;
    async fn all_accounts(&self) -> Result<Vec<BankAccount>, StoreError>;
}

pub type MessageQueueBox = Box<dyn MessageQueue>;
pub type AccountStoreBox = Box<dyn AccountStore>;
