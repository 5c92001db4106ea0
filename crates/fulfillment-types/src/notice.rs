//! User-facing notices.
//!
//! Notices are emitted as untranslated message keys plus interpolation
//! parameters; turning them into text is the notification sink's job.

use serde::{Deserialize, Serialize};

/// A user-facing notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
	/// A listing matched nothing.
	OrdersNotFound,
	/// A single-order lookup matched nothing.
	OrderNotFound,
	/// Generic failure.
	SomethingWentWrong,
	/// A shipment was handed over to its customer.
	OrderDeliveredTo { customer_name: String },
	/// A ship group was packed.
	OrderPackedForDelivery,
	/// Items of an order were rejected.
	ItemsCanceled { order_id: String },
}

impl Notice {
	/// Translation key of the notice.
	pub fn key(&self) -> &'static str {
		match self {
			Notice::OrdersNotFound => "Orders Not Found",
			Notice::OrderNotFound => "Order not found",
			Notice::SomethingWentWrong => "Something went wrong",
			Notice::OrderDeliveredTo { .. } => "Order delivered to",
			Notice::OrderPackedForDelivery => "Order packed and ready for delivery",
			Notice::ItemsCanceled { .. } => "All items were canceled from the order",
		}
	}

	/// Interpolation parameters of the notice.
	pub fn params(&self) -> Vec<(&'static str, String)> {
		match self {
			Notice::OrderDeliveredTo { customer_name } => {
				vec![("customerName", customer_name.clone())]
			},
			_ => Vec::new(),
		}
	}

	/// Text appended after the translated key.
	pub fn suffix(&self) -> Option<&str> {
		match self {
			Notice::ItemsCanceled { order_id } => Some(order_id),
			_ => None,
		}
	}
}
