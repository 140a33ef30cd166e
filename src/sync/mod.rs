//! Concurrency backbone
//!
//! All ledger mutation flows through the update scheduler's single FIFO
//! queue; read-only aggregation does not.

pub mod scheduler;

pub use scheduler::{UpdateError, UpdateOutcome, UpdateScheduler, UPDATE_TIMEOUT};
