//! Event types for observing client-side state.
//!
//! Every committed state change is published as a `FulfillmentEvent` so that
//! embedders can react to store updates without polling the store.

use crate::{OrderCollection, ShipmentStatus};
use serde::{Deserialize, Serialize};

/// Main event type encompassing all fulfillment events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FulfillmentEvent {
	/// A paginated collection was replaced or extended.
	CollectionUpdated {
		collection: OrderCollection,
		/// Orders materialized locally after the merge.
		loaded: usize,
		/// Backend-wide count reported by the last fetch.
		total: u64,
	},
	/// A new current order was resolved.
	CurrentOrderUpdated { order_id: String, items: usize },
	/// A reject-items batch finished.
	ItemsRejected {
		order_id: String,
		submitted: usize,
		failed: usize,
	},
	/// A ship group was shipped through the quick-ship flow.
	ShipGroupShipped {
		order_id: String,
		ship_group_seq_id: String,
	},
	/// A shipment moved to a new status.
	ShipmentStatusChanged {
		shipment_id: String,
		status: ShipmentStatus,
	},
}
