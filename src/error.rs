use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// A transaction amount that failed domain validation.
#[derive(Error, Debug)]
#[error("amount must be non-negative, got {value}")]
pub struct AmountError {
    pub value: Decimal,
}

/// Failure to turn a raw queue payload into a typed event.
///
/// Decode failures are unrecoverable for the current cycle: they escape to
/// the worker's top-level fault path instead of being handled in place.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("payload is not valid JSON")]
    Json(#[from] serde_json::Error),
    #[error("payload root must be a JSON object")]
    NotAnObject,
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("field `{field}` is not a valid UUID: {value}")]
    InvalidUuid { field: &'static str, value: String },
    #[error("field `amount` is not a valid decimal: {value}")]
    InvalidAmount { value: String },
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Account store failures surfaced through the ledger port.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O failed")]
    Io(#[from] std::io::Error),
}

/// Queue transport failures. These are infrastructure faults, not domain
/// errors: no component-local handler catches them.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("queue unavailable: {0}")]
    Unavailable(String),
}

/// Domain failures while applying an event to the ledger. These are handled
/// within the cycle: the message is logged and abandoned for redelivery.
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("account {account_id} not found")]
    AccountNotFound { account_id: Uuid },
    #[error("unsupported message type `{kind}`")]
    UnsupportedMessageType { kind: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Faults that halt the worker loop.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
