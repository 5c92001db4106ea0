//! Common types for the fulfillment workspace.
//!
//! This crate defines the domain model shared by every other crate: normalized
//! order records, the paginated collections that hold them, the query and
//! response shapes exchanged with the search backend, and the request/reply
//! shapes exchanged with the status-change backend.

/// Domain events published when client-side state changes.
pub mod events;
/// User-facing notices handed to the notification collaborator.
pub mod notice;
/// Order records, items and the paginated collections holding them.
pub mod order;
/// Self-registration of pluggable backend implementations.
pub mod registry;
/// Search backend query and response types.
pub mod search;
/// Redacting wrapper for credentials.
pub mod secret_string;
/// Status-change backend request and reply types.
pub mod shipment;
/// Small formatting helpers.
pub mod utils;
/// Configuration validation types for implementation-specific tables.
pub mod validation;

pub use events::*;
pub use notice::Notice;
pub use order::*;
pub use registry::ImplementationRegistry;
pub use search::*;
pub use secret_string::SecretString;
pub use shipment::*;
pub use utils::{error_marker, truncate_id};
pub use validation::*;
