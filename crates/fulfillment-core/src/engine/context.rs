//! Query context passed into every fetch.

use fulfillment_config::ClientConfig;

/// User preferences that shape backend queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryContext {
	/// When false the client only handles in-store pickup, and every open
	/// order query is restricted to the pickup shipment method.
	pub shipping_orders_enabled: bool,
}

impl QueryContext {
	pub fn new(shipping_orders_enabled: bool) -> Self {
		Self {
			shipping_orders_enabled,
		}
	}

	/// True when queries must be restricted to store pickup.
	pub fn pickup_only(&self) -> bool {
		!self.shipping_orders_enabled
	}
}

impl Default for QueryContext {
	fn default() -> Self {
		Self::new(true)
	}
}

impl From<&ClientConfig> for QueryContext {
	fn from(client: &ClientConfig) -> Self {
		Self::new(client.shipping_orders)
	}
}
