//! Status-change backend collaborator for the fulfillment client.
//!
//! Rejecting order items, quick-shipping a ship group and moving shipments
//! between statuses all go through the status-change backend. Each call
//! answers with an event message or an error marker; both come back as a
//! `StatusReply` so that callers can aggregate per-item outcomes without
//! unwinding on the first refusal.

use async_trait::async_trait;
use fulfillment_types::{
	truncate_id, ConfigSchema, ImplementationRegistry, QuickShipRequest, RejectItemRequest,
	ShipmentUpdateRequest, StatusReply,
};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
}

/// Errors that can occur while talking to the status-change backend.
#[derive(Debug, Error)]
pub enum ShipmentError {
	/// The request never produced a response.
	#[error("Network error: {0}")]
	Network(String),
	/// The backend answered with a non-success HTTP status.
	#[error("HTTP {status} from {url}")]
	Http { status: u16, url: String },
	/// The response body could not be interpreted.
	#[error("Parse error: {0}")]
	Parse(String),
	/// The implementation configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for status-change backend implementations.
#[async_trait]
pub trait ShipmentInterface: Send + Sync {
	/// Returns the configuration schema for this implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Rejects one order item.
	async fn reject_order_item(&self, request: &RejectItemRequest) -> Result<StatusReply, ShipmentError>;

	/// Ships an entire ship group in a single package.
	///
	/// On success the event message names the created shipment.
	async fn quick_ship_entire_ship_group(
		&self,
		request: &QuickShipRequest,
	) -> Result<StatusReply, ShipmentError>;

	/// Moves a shipment to a new status.
	async fn update_shipment(&self, request: &ShipmentUpdateRequest) -> Result<StatusReply, ShipmentError>;
}

/// Type alias for shipment factory functions.
pub type ShipmentFactory = fn(&toml::Value) -> Result<Box<dyn ShipmentInterface>, ShipmentError>;

/// Registry trait for shipment implementations.
pub trait ShipmentRegistry: ImplementationRegistry<Factory = ShipmentFactory> {}

/// Get all registered shipment implementations.
pub fn get_all_implementations() -> Vec<(&'static str, ShipmentFactory)> {
	use implementations::http;

	vec![(http::Registry::NAME, http::Registry::factory())]
}

/// Service wrapping the configured status-change implementation.
pub struct ShipmentService {
	backend: Box<dyn ShipmentInterface>,
}

impl ShipmentService {
	/// Creates a new ShipmentService with the specified backend.
	pub fn new(backend: Box<dyn ShipmentInterface>) -> Self {
		Self { backend }
	}

	pub async fn reject_order_item(
		&self,
		request: &RejectItemRequest,
	) -> Result<StatusReply, ShipmentError> {
		tracing::debug!(
			order_id = %truncate_id(&request.order_id),
			order_item_seq_id = %request.order_item_seq_id,
			quantity = request.quantity,
			"Rejecting order item"
		);
		self.backend.reject_order_item(request).await
	}

	pub async fn quick_ship_entire_ship_group(
		&self,
		request: &QuickShipRequest,
	) -> Result<StatusReply, ShipmentError> {
		tracing::debug!(
			order_id = %truncate_id(&request.order_id),
			ship_group_seq_id = %request.ship_group_seq_id,
			"Quick-shipping ship group"
		);
		self.backend.quick_ship_entire_ship_group(request).await
	}

	pub async fn update_shipment(
		&self,
		request: &ShipmentUpdateRequest,
	) -> Result<StatusReply, ShipmentError> {
		tracing::debug!(
			shipment_id = %request.shipment_id,
			status = %request.status,
			"Updating shipment"
		);
		self.backend.update_shipment(request).await
	}
}
