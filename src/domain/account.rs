use crate::domain::event::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use uuid::Uuid;

/// The monetary balance of a bank account.
///
/// A wrapper around `rust_decimal::Decimal` to keep balance arithmetic
/// type-safe. Unlike `Amount`, a balance may be negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.value())
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The state of a bank account as held by the persistent store.
///
/// The account row pre-exists the worker and outlives every cycle; only its
/// `balance` field is mutated, and only by the processor.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct BankAccount {
    pub id: Uuid,
    pub balance: Balance,
}

impl BankAccount {
    pub fn new(id: Uuid, balance: Balance) -> Self {
        Self { id, balance }
    }

    /// Adds the amount to the balance.
    pub fn credit(&mut self, amount: Amount) {
        self.balance += amount.into();
    }

    /// Subtracts the amount from the balance.
    ///
    /// No overdraft floor is enforced: a debit may drive the balance negative.
    pub fn debit(&mut self, amount: Amount) {
        self.balance -= amount.into();
    }
}
