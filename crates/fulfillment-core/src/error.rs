//! Error taxonomy of the core operations.

use fulfillment_search::SearchError;
use fulfillment_shipment::ShipmentError;
use thiserror::Error;

/// Errors surfaced by core operations.
///
/// A batch in which only some items failed is not an error; it is reported
/// through `BatchOutcome`.
#[derive(Debug, Error)]
pub enum FulfillmentError {
	/// Nothing matched the request.
	#[error("Not found: {0}")]
	NotFound(String),
	/// A backend call failed or could not be interpreted.
	#[error("Transport error: {0}")]
	Transport(String),
	/// The caller supplied something the operation cannot act on.
	#[error("Invalid input: {0}")]
	InvalidInput(String),
}

impl From<SearchError> for FulfillmentError {
	fn from(err: SearchError) -> Self {
		FulfillmentError::Transport(err.to_string())
	}
}

impl From<ShipmentError> for FulfillmentError {
	fn from(err: ShipmentError) -> Self {
		FulfillmentError::Transport(err.to_string())
	}
}
