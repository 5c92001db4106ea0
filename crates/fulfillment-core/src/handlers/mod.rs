//! Handlers behind the single-order and status-change operations.
//!
//! The detail resolver serves one order at a time from the store or the
//! search backend; the batch updater fans status changes out to the
//! status-change backend and folds the replies into one outcome.

pub mod batch;
pub mod detail;

pub use batch::{BatchItemUpdater, BatchOutcome, ItemResult, ShipOutcome};
pub use detail::{DetailResolver, DetailSource, ResolvedDetail};
