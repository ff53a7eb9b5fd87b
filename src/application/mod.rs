//! Application layer orchestrating the message-intake cycle.
//!
//! The `Worker` drives the sequential peek → decode → route → apply →
//! acknowledge loop; the `Processor` owns the ledger mutation within it.

pub mod processor;
pub mod worker;

pub use processor::Processor;
pub use worker::{HaltCause, Route, Worker, WorkerState};
