use crate::error::AmountError;
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

/// A non-negative monetary amount carried by debit and credit events.
///
/// Wraps `rust_decimal::Decimal` so that validated amounts cannot be confused
/// with arbitrary decimals in balance arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(AmountError { value })
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A transaction event decoded from a queue message.
///
/// Each variant carries only the fields it needs: `Info` and `Error` are
/// informational echoes with no monetary effect. `Unsupported` preserves a
/// structurally valid payload whose `messageType` names no known kind, so the
/// processor can reject it explicitly instead of the decoder dropping it.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionEvent {
    Debit {
        id: Uuid,
        account_id: Uuid,
        amount: Amount,
    },
    Credit {
        id: Uuid,
        account_id: Uuid,
        amount: Amount,
    },
    Info {
        id: Uuid,
        account_id: Uuid,
    },
    Error {
        id: Uuid,
        account_id: Uuid,
    },
    Unsupported {
        id: Uuid,
        account_id: Uuid,
        kind: String,
    },
}

impl TransactionEvent {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Debit { id, .. }
            | Self::Credit { id, .. }
            | Self::Info { id, .. }
            | Self::Error { id, .. }
            | Self::Unsupported { id, .. } => *id,
        }
    }

    pub fn account_id(&self) -> Uuid {
        match self {
            Self::Debit { account_id, .. }
            | Self::Credit { account_id, .. }
            | Self::Info { account_id, .. }
            | Self::Error { account_id, .. }
            | Self::Unsupported { account_id, .. } => *account_id,
        }
    }

    /// Wire-level name of the event kind, for logs and dead-letter records.
    pub fn kind(&self) -> &str {
        match self {
            Self::Debit { .. } => "Debit",
            Self::Credit { .. } => "Credit",
            Self::Info { .. } => "Info",
            Self::Error { .. } => "Error",
            Self::Unsupported { kind, .. } => kind,
        }
    }

    /// Debit and Credit are the only kinds that move money.
    pub fn is_transactional(&self) -> bool {
        matches!(self, Self::Debit { .. } | Self::Credit { .. })
    }
}
