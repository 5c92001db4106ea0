//! Order domain types.
//!
//! Orders arrive from the search backend as loosely typed documents. The types
//! here are the normalized, owned representation the rest of the workspace
//! works with: scalar order attributes are lifted into typed fields and every
//! other document field is kept verbatim in `attributes`.

use crate::search::{document_str, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Shipment method of items fulfilled by in-store pickup.
pub const STORE_PICKUP: &str = "STOREPICKUP";

/// Document keys lifted into typed `OrderItem` fields.
const ITEM_KEYS: [&str; 5] = [
	"productId",
	"shipmentMethodTypeId",
	"orderItemSeqId",
	"facilityId",
	"shipGroupSeqId",
];

/// One line-level document of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub product_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub shipment_method_type_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub order_item_seq_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub facility_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ship_group_seq_id: Option<String>,
	/// Remaining document fields, passed through untouched.
	#[serde(flatten)]
	pub attributes: Document,
}

impl OrderItem {
	/// Builds an item from a raw search document without consuming it.
	pub fn from_document(doc: &Document) -> Self {
		let attributes = doc
			.iter()
			.filter(|(key, _)| !ITEM_KEYS.contains(&key.as_str()))
			.map(|(key, value)| (key.clone(), value.clone()))
			.collect();

		Self {
			product_id: document_str(doc, "productId").filter(|id| !id.is_empty()),
			shipment_method_type_id: document_str(doc, "shipmentMethodTypeId"),
			order_item_seq_id: document_str(doc, "orderItemSeqId"),
			facility_id: document_str(doc, "facilityId"),
			ship_group_seq_id: document_str(doc, "shipGroupSeqId"),
			attributes,
		}
	}

	/// Identity of the item within its order, when both sequence ids are known.
	pub fn identity(&self) -> Option<(&str, &str)> {
		match (&self.order_item_seq_id, &self.ship_group_seq_id) {
			(Some(item), Some(group)) => Some((item.as_str(), group.as_str())),
			_ => None,
		}
	}

	/// Returns true when the item is fulfilled through `shipment_method`.
	pub fn is_shipped_by(&self, shipment_method: &str) -> bool {
		self.shipment_method_type_id.as_deref() == Some(shipment_method)
	}

	/// Raw passthrough field.
	pub fn attribute(&self, key: &str) -> Option<&Value> {
		self.attributes.get(key)
	}
}

/// Customer attached to an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
	#[serde(default)]
	pub name: Option<String>,
}

/// Normalized order entity.
///
/// Scalar fields come from the first document of the order's document group;
/// `items` keeps every document of the group in backend order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
	pub order_id: String,
	#[serde(default)]
	pub order_name: Option<String>,
	#[serde(default)]
	pub customer: Customer,
	#[serde(default)]
	pub status_id: Option<String>,
	#[serde(default)]
	pub date: Option<String>,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub phone_number: Option<String>,
	#[serde(default)]
	pub items: Vec<OrderItem>,
	/// Order-level fields of flat listing documents (shipment id, ...).
	#[serde(default, skip_serializing_if = "Document::is_empty")]
	pub attributes: Document,
}

impl OrderRecord {
	/// Lifts the order-level scalar fields out of `head`.
	///
	/// `fallback_id` is used when the document does not carry its own order id,
	/// which happens when the id only exists as the group key.
	pub fn from_head_document(head: &Document, fallback_id: Option<&str>, items: Vec<OrderItem>) -> Self {
		let order_id = document_str(head, "orderId")
			.or_else(|| fallback_id.map(str::to_string))
			.unwrap_or_default();

		Self {
			order_id,
			order_name: document_str(head, "orderName"),
			customer: Customer {
				name: document_str(head, "customerPartyName")
					.or_else(|| document_str(head, "customerName")),
			},
			status_id: document_str(head, "orderStatusId"),
			date: document_str(head, "orderDate"),
			email: document_str(head, "customerEmailId"),
			phone_number: document_str(head, "phoneNumber"),
			items,
			attributes: Document::new(),
		}
	}

	/// Returns a copy whose items are restricted to one shipment method.
	pub fn restricted_to(&self, shipment_method: &str) -> Self {
		Self {
			items: self
				.items
				.iter()
				.filter(|item| item.is_shipped_by(shipment_method))
				.cloned()
				.collect(),
			..self.clone()
		}
	}

	/// Finds the first item belonging to the given ship group.
	pub fn ship_group_item(&self, ship_group_seq_id: &str) -> Option<&OrderItem> {
		self.items
			.iter()
			.find(|item| item.ship_group_seq_id.as_deref() == Some(ship_group_seq_id))
	}

	/// Product identifiers of the order's items, in item order, possibly repeated.
	pub fn product_ids(&self) -> impl Iterator<Item = &str> {
		self.items.iter().filter_map(|item| item.product_id.as_deref())
	}

	/// Raw order-level passthrough field as a string.
	pub fn attribute_str(&self, key: &str) -> Option<String> {
		document_str(&self.attributes, key)
	}
}

/// One of the independently paginated order collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagedOrderList {
	/// Orders in fetch order.
	pub list: Vec<OrderRecord>,
	/// Matching orders on the backend at the last fetch.
	pub total: u64,
}

impl PagedOrderList {
	/// True when nothing is materialized locally.
	pub fn is_empty(&self) -> bool {
		self.list.is_empty()
	}

	/// Finds an order by id.
	pub fn find(&self, order_id: &str) -> Option<&OrderRecord> {
		self.list.iter().find(|order| order.order_id == order_id)
	}
}

/// Names of the tracked collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderCollection {
	/// Orders waiting to be picked and packed.
	Open,
	/// Orders packed and waiting for handover.
	Packed,
}

impl OrderCollection {
	/// Returns the string representation of the collection name.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderCollection::Open => "open",
			OrderCollection::Packed => "packed",
		}
	}

	/// Returns an iterator over all collections.
	pub fn all() -> impl Iterator<Item = Self> {
		[Self::Open, Self::Packed].into_iter()
	}
}

impl fmt::Display for OrderCollection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for OrderCollection {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"open" => Ok(Self::Open),
			"packed" => Ok(Self::Packed),
			_ => Err(()),
		}
	}
}
