//! Single-order resolution.
//!
//! An order is served from the current slot, then from the open collection,
//! and only then from the backend. Whatever the source, the current order
//! holds only the items of the requested shipment method.

use crate::error::FulfillmentError;
use crate::fetcher::Fetcher;
use crate::normalizer;
use crate::sinks::Collaborators;
use crate::state::ListStore;
use fulfillment_types::{truncate_id, OrderRecord, SearchQuery};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

/// Where a resolved order came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailSource {
	/// Already the current order; returned as is.
	Current,
	/// Found in the open collection.
	OpenList,
	/// Fetched from the search backend.
	Backend,
}

/// A resolved order and its source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDetail {
	pub order: OrderRecord,
	pub source: DetailSource,
}

/// Resolves single orders and maintains the current order slot.
pub struct DetailResolver {
	fetcher: Arc<Fetcher>,
	store: Arc<ListStore>,
	collaborators: Collaborators,
}

impl DetailResolver {
	pub fn new(fetcher: Arc<Fetcher>, store: Arc<ListStore>, collaborators: Collaborators) -> Self {
		Self {
			fetcher,
			store,
			collaborators,
		}
	}

	/// Resolves `order_id`, restricting its items to `shipment_method`.
	///
	/// `query` overrides the backend lookup used on a cache miss; by default
	/// the order is looked up by id. Fails with `NotFound` when the backend
	/// returns no group, in which case the current order is left untouched.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn resolve(
		&self,
		order_id: &str,
		shipment_method: &str,
		query: Option<SearchQuery>,
	) -> Result<ResolvedDetail, FulfillmentError> {
		if let Some(order) = self.store.current_if(order_id).await {
			tracing::debug!("Served from current order");
			return Ok(ResolvedDetail {
				order,
				source: DetailSource::Current,
			});
		}

		if let Some(order) = self.store.find_in_open(order_id).await {
			tracing::debug!("Served from open orders");
			let product_ids = order.product_ids().map(str::to_string).collect::<Vec<_>>();
			let order = self.update_current(&order, shipment_method).await;
			self.collaborators.hydrate(dedup(product_ids), true);
			return Ok(ResolvedDetail {
				order,
				source: DetailSource::OpenList,
			});
		}

		let query =
			query.unwrap_or_else(|| SearchQuery::order_detail(order_id, self.fetcher.group_limit()));
		let response = self.fetcher.fetch_order_detail(&query).await?;

		if response.is_empty_or_failed() {
			if let Some(error) = &response.error {
				tracing::warn!(error = %error, "Order lookup refused");
			}
			return Err(FulfillmentError::NotFound(order_id.to_string()));
		}

		let normalized = normalizer::normalize(&response);
		let Some(first) = normalized.orders.first() else {
			return Err(FulfillmentError::NotFound(order_id.to_string()));
		};

		let order = self.update_current(first, shipment_method).await;
		self.collaborators.hydrate(normalized.product_ids, true);

		tracing::info!(items = order.items.len(), "Fetched order detail");
		Ok(ResolvedDetail {
			order,
			source: DetailSource::Backend,
		})
	}

	async fn update_current(&self, order: &OrderRecord, shipment_method: &str) -> OrderRecord {
		let current = order.restricted_to(shipment_method);
		self.store.set_current(current.clone()).await;
		current
	}
}

fn dedup(ids: Vec<String>) -> Vec<String> {
	let mut seen = std::collections::HashSet::new();
	ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
