//! Batched status changes against the status-change backend.
//!
//! Rejections fan out one request per item and every item always yields one
//! result slot, whatever happens to its request. Quick-ship is a two-call
//! sequence: the ship group is shipped first and, unless it is a pickup
//! group, the created shipment is then marked packed. A failed second call is
//! reported, never rolled back.

use crate::error::FulfillmentError;
use fulfillment_shipment::ShipmentService;
use fulfillment_types::{
	truncate_id, OrderRecord, QuickShipRequest, RejectItem, RejectItemRequest, ShipmentStatus,
	ShipmentUpdateRequest, StatusReply, STORE_PICKUP,
};
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// First run of ASCII digits.
static SHIPMENT_ID: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[0-9]+").ok());

/// Outcome of one item of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemResult {
	/// The backend answered; the reply may still carry an error marker.
	Reply { reply: StatusReply },
	/// The request failed or was never sent.
	Failed { error: String },
}

impl ItemResult {
	/// True when the result carries no error of any kind.
	pub fn succeeded(&self) -> bool {
		matches!(self, ItemResult::Reply { reply } if !reply.has_error())
	}
}

/// Aggregate result of a batch of item-level calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
	/// One result per submitted item, in submission order.
	pub results: Vec<ItemResult>,
	/// True when at least one item succeeded.
	pub overall_succeeded: bool,
}

impl BatchOutcome {
	pub fn from_results(results: Vec<ItemResult>) -> Self {
		let overall_succeeded = results.iter().any(ItemResult::succeeded);
		Self {
			results,
			overall_succeeded,
		}
	}

	pub fn failed_count(&self) -> usize {
		self.results.iter().filter(|r| !r.succeeded()).count()
	}
}

/// Outcome of shipping a ship group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShipOutcome {
	/// The backend refused to ship the group. Nothing changed.
	Refused { reason: String },
	/// A pickup group was shipped; no packing step applies.
	Shipped { event_message: String },
	/// The group was shipped and its shipment marked packed.
	Packed { shipment_id: String },
	/// The group was shipped but marking it packed failed.
	PackFailed {
		shipment_id: Option<String>,
		reason: String,
	},
}

impl ShipOutcome {
	/// True when the ship group left the open state.
	pub fn shipped(&self) -> bool {
		!matches!(self, ShipOutcome::Refused { .. })
	}
}

/// Coerces a caller-supplied quantity to an integer.
///
/// Numbers are truncated toward zero; strings are read up to the first
/// non-digit after optional leading whitespace and sign. Values beyond the
/// `i64` range saturate. Anything else has no quantity.
pub fn coerce_quantity(value: &Value) -> Option<i64> {
	match value {
		Value::Number(n) => n
			.as_i64()
			.or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
		Value::String(s) => {
			let s = s.trim_start();
			let (sign, digits) = match s.strip_prefix('-') {
				Some(rest) => (-1, rest),
				None => (1, s.strip_prefix('+').unwrap_or(s)),
			};
			let end = digits
				.find(|c: char| !c.is_ascii_digit())
				.unwrap_or(digits.len());
			if end == 0 {
				return None;
			}
			// Only overflow can fail on a non-empty run of ASCII digits
			let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
			Some(sign * magnitude)
		},
		_ => None,
	}
}

/// Extracts the shipment id from a quick-ship event message.
pub fn parse_shipment_id(message: &str) -> Option<String> {
	SHIPMENT_ID
		.as_ref()?
		.find(message)
		.map(|m| m.as_str().to_string())
}

/// Issues item-level and shipment-level status changes.
pub struct BatchItemUpdater {
	shipment: Arc<ShipmentService>,
}

impl BatchItemUpdater {
	pub fn new(shipment: Arc<ShipmentService>) -> Self {
		Self { shipment }
	}

	/// Rejects every item of `items` concurrently.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id), items = items.len()))]
	pub async fn reject_items(&self, order_id: &str, items: &[RejectItem]) -> BatchOutcome {
		let requests = items.iter().map(|item| async move {
			let Some(quantity) = coerce_quantity(&item.quantity) else {
				return ItemResult::Failed {
					error: format!("Invalid quantity: {}", item.quantity),
				};
			};

			let request = RejectItemRequest {
				order_id: order_id.to_string(),
				reject_reason: item.reason.clone(),
				facility_id: item.facility_id.clone(),
				order_item_seq_id: item.order_item_seq_id.clone(),
				shipment_method_type_id: item.shipment_method_type_id.clone(),
				quantity,
			};

			match self.shipment.reject_order_item(&request).await {
				Ok(reply) => ItemResult::Reply { reply },
				Err(e) => {
					tracing::warn!(
						order_item_seq_id = %item.order_item_seq_id,
						error = %e,
						"Reject request failed"
					);
					ItemResult::Failed {
						error: e.to_string(),
					}
				},
			}
		});

		let outcome = BatchOutcome::from_results(join_all(requests).await);
		tracing::info!(
			failed = outcome.failed_count(),
			overall_succeeded = outcome.overall_succeeded,
			"Rejected items"
		);
		outcome
	}

	/// Ships one ship group of `order` and packs the resulting shipment.
	///
	/// Fails with `InvalidInput` before any call when the order has no item
	/// in the ship group, and with `Transport` when the ship call itself
	/// failed.
	#[instrument(skip_all, fields(order_id = %truncate_id(&order.order_id), ship_group = %ship_group_seq_id))]
	pub async fn quick_ship_group(
		&self,
		order: &OrderRecord,
		ship_group_seq_id: &str,
		facility_id: Option<String>,
	) -> Result<ShipOutcome, FulfillmentError> {
		let item = order.ship_group_item(ship_group_seq_id).ok_or_else(|| {
			FulfillmentError::InvalidInput(format!(
				"Order {} has no item in ship group {}",
				order.order_id, ship_group_seq_id
			))
		})?;

		let request =
			QuickShipRequest::with_default_package(&order.order_id, facility_id, ship_group_seq_id);
		let reply = self.shipment.quick_ship_entire_ship_group(&request).await?;

		let event_message = match (reply.error, reply.event_message) {
			(Some(error), _) => return Ok(ShipOutcome::Refused { reason: error }),
			(None, None) => {
				return Ok(ShipOutcome::Refused {
					reason: "No event message in reply".to_string(),
				})
			},
			(None, Some(message)) => message,
		};

		if item.is_shipped_by(STORE_PICKUP) {
			return Ok(ShipOutcome::Shipped { event_message });
		}

		let Some(shipment_id) = parse_shipment_id(&event_message) else {
			tracing::warn!(event_message = %event_message, "No shipment id in event message");
			return Ok(ShipOutcome::PackFailed {
				shipment_id: None,
				reason: format!("No shipment id in \"{}\"", event_message),
			});
		};

		let outcome = match self.pack_items(&shipment_id).await {
			Ok(reply) => match reply.error {
				Some(error) => ShipOutcome::PackFailed {
					shipment_id: Some(shipment_id),
					reason: error,
				},
				None => ShipOutcome::Packed { shipment_id },
			},
			Err(e) => ShipOutcome::PackFailed {
				shipment_id: Some(shipment_id),
				reason: e.to_string(),
			},
		};

		if let ShipOutcome::PackFailed { reason, .. } = &outcome {
			tracing::warn!(reason = %reason, "Ship group shipped but not packed");
		}
		Ok(outcome)
	}

	/// Marks a shipment packed.
	pub async fn pack_items(&self, shipment_id: &str) -> Result<StatusReply, FulfillmentError> {
		self.update_shipment(shipment_id, ShipmentStatus::Packed).await
	}

	/// Moves a shipment to `status`.
	pub async fn update_shipment(
		&self,
		shipment_id: &str,
		status: ShipmentStatus,
	) -> Result<StatusReply, FulfillmentError> {
		let request = ShipmentUpdateRequest {
			shipment_id: shipment_id.to_string(),
			status,
		};
		Ok(self.shipment.update_shipment(&request).await?)
	}
}
