//! Order aggregation and state reconciliation for the fulfillment client.
//!
//! Orders flow from the search backend through the `Fetcher`, are reshaped
//! by the `normalizer` and merged into the `ListStore`, which holds the open
//! and packed collections plus the current order. The `DetailResolver` serves
//! single orders from that store or the backend, and the `BatchItemUpdater`
//! fans status changes out to the status-change backend. `FulfillmentEngine`
//! composes all of them behind the operations exposed to callers.

pub mod builder;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod handlers;
pub mod normalizer;
pub mod sinks;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use builder::{BuilderError, EngineBuilder, EngineFactories};
pub use engine::{context::QueryContext, event_bus::EventBus, FulfillmentEngine};
pub use error::FulfillmentError;
pub use fetcher::Fetcher;
pub use handlers::{BatchItemUpdater, BatchOutcome, DetailResolver, ItemResult, ShipOutcome};
pub use normalizer::Normalized;
pub use sinks::{Collaborators, NotificationSink, ProductCatalog, ProgressSink, StockCache};
pub use state::ListStore;
