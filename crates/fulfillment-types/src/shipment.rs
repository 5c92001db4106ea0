//! Status-change backend types.
//!
//! Requests carry an identifier, a target status and optional per-item detail.
//! Replies are either marked with an error or carry an event message.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Target statuses for shipment updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipmentStatus {
	#[serde(rename = "SHIPMENT_PACKED")]
	Packed,
	#[serde(rename = "SHIPMENT_SHIPPED")]
	Shipped,
}

impl ShipmentStatus {
	/// Returns the backend status id.
	pub fn as_str(&self) -> &'static str {
		match self {
			ShipmentStatus::Packed => "SHIPMENT_PACKED",
			ShipmentStatus::Shipped => "SHIPMENT_SHIPPED",
		}
	}
}

impl fmt::Display for ShipmentStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Reply of a status-change call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReply {
	/// Event message describing what the backend did.
	#[serde(default)]
	pub event_message: Option<String>,
	/// Error marker, present when the backend refused the change.
	#[serde(default)]
	pub error: Option<String>,
}

impl StatusReply {
	/// A reply carrying only an event message.
	pub fn event(message: impl Into<String>) -> Self {
		Self {
			event_message: Some(message.into()),
			error: None,
		}
	}

	/// A reply carrying an error marker.
	pub fn failed(message: impl Into<String>) -> Self {
		Self {
			event_message: None,
			error: Some(message.into()),
		}
	}

	/// True when the backend marked the reply as an error.
	pub fn has_error(&self) -> bool {
		self.error.is_some()
	}
}

/// Caller-supplied description of one item to reject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectItem {
	/// Rejection reason id.
	pub reason: String,
	#[serde(default)]
	pub facility_id: Option<String>,
	pub order_item_seq_id: String,
	#[serde(default)]
	pub shipment_method_type_id: Option<String>,
	/// Quantity as supplied by the caller; coerced to an integer before dispatch.
	pub quantity: Value,
}

/// Per-item rejection request sent to the status-change backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectItemRequest {
	pub order_id: String,
	pub reject_reason: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub facility_id: Option<String>,
	pub order_item_seq_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub shipment_method_type_id: Option<String>,
	pub quantity: i64,
}

/// Request shipping an entire ship group in one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickShipRequest {
	pub order_id: String,
	pub set_packed_only: String,
	pub dimension_uom_id: String,
	pub shipment_box_type_id: String,
	pub weight: String,
	pub weight_uom_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub facility_id: Option<String>,
	pub ship_group_seq_id: String,
}

impl QuickShipRequest {
	/// Builds the request with the placeholder package the backend expects
	/// when no real measurements were taken.
	pub fn with_default_package(
		order_id: impl Into<String>,
		facility_id: Option<String>,
		ship_group_seq_id: impl Into<String>,
	) -> Self {
		Self {
			order_id: order_id.into(),
			set_packed_only: "Y".to_string(),
			dimension_uom_id: "WT_kg".to_string(),
			shipment_box_type_id: "YOURPACKNG".to_string(),
			weight: "1".to_string(),
			weight_uom_id: "WT_kg".to_string(),
			facility_id,
			ship_group_seq_id: ship_group_seq_id.into(),
		}
	}
}

/// Request moving a shipment to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentUpdateRequest {
	pub shipment_id: String,
	#[serde(rename = "statusId")]
	pub status: ShipmentStatus,
}
