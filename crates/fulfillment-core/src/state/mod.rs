//! Client-side order state.
//!
//! The list store owns the open and packed collections and the current
//! order slot. Merges into a collection are serialized through a writer gate
//! so that pages land in the order their fetches were issued.

pub mod list_store;

pub use list_store::{ListStore, MergeGate};
