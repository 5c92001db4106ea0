//! Reshapes search responses into order records.
//!
//! Grouped responses carry one group per order, each group holding the
//! order's item documents. Order-level fields are read from the first
//! document of a group; every document becomes an item. Flat listings (packed
//! orders) carry one document per order with its items embedded.

use fulfillment_types::{Document, DocumentList, GroupedDocuments, OrderItem, OrderRecord};
use serde_json::Value;
use std::collections::HashSet;

/// Orders built from one response plus the products they reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
	/// One record per group (or document), in response order.
	pub orders: Vec<OrderRecord>,
	/// Distinct non-empty product ids across all items, first-seen order.
	pub product_ids: Vec<String>,
}

impl Normalized {
	fn from_orders(orders: Vec<OrderRecord>) -> Self {
		let mut seen = HashSet::new();
		let product_ids = orders
			.iter()
			.flat_map(OrderRecord::product_ids)
			.filter(|id| seen.insert(*id))
			.map(str::to_string)
			.collect();

		Self {
			orders,
			product_ids,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.orders.is_empty()
	}
}

/// Normalizes a grouped response into one record per group.
///
/// A group without documents still yields a record, identified by the
/// group's key and with no items.
pub fn normalize(response: &GroupedDocuments) -> Normalized {
	let empty = Document::new();
	let orders = response
		.groups
		.iter()
		.map(|group| {
			let head = group.docs.first().unwrap_or(&empty);
			let items = group.docs.iter().map(OrderItem::from_document).collect();
			OrderRecord::from_head_document(head, group.group_value.as_deref(), items)
		})
		.collect();

	Normalized::from_orders(orders)
}

/// Normalizes a flat listing whose documents embed their items.
///
/// Everything but the `items` array is kept as order-level attributes so
/// that fields such as the shipment id stay reachable.
pub fn normalize_flat(list: &DocumentList) -> Normalized {
	let orders = list
		.docs
		.iter()
		.map(|doc| {
			let items = doc
				.get("items")
				.and_then(Value::as_array)
				.map(|items| {
					items
						.iter()
						.filter_map(Value::as_object)
						.map(OrderItem::from_document)
						.collect()
				})
				.unwrap_or_default();

			let mut order = OrderRecord::from_head_document(doc, None, items);
			order.attributes = doc
				.iter()
				.filter(|(key, _)| key.as_str() != "items")
				.map(|(key, value)| (key.clone(), value.clone()))
				.collect();
			order
		})
		.collect();

	Normalized::from_orders(orders)
}
