//! Query shaping and dispatch against the search backend.
//!
//! Open orders are fetched in two stages. The listing endpoint returns one
//! lightweight document per candidate order; a grouped query then pulls every
//! item document of exactly those orders. Packed orders come back complete
//! from their listing endpoint, and single orders use a grouped lookup.

use crate::engine::context::QueryContext;
use fulfillment_search::{SearchError, SearchService};
use fulfillment_types::{
	document_str, quote_term, DocumentList, GroupedDocuments, PageQuery, SearchQuery,
	ORDER_ID_FIELD, STORE_PICKUP,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Input field carrying the shipment method filter of page queries.
const SHIPMENT_METHOD_FIELD: &str = "shipmentMethodTypeId";

/// Result of a successful two-stage open orders fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenOrdersResponse {
	/// Backend count reported by the listing stage.
	pub total: u64,
	/// Item documents of the candidate orders, grouped by order id.
	pub grouped: GroupedDocuments,
}

/// Issues search backend queries.
pub struct Fetcher {
	search: Arc<SearchService>,
	group_limit: u32,
}

impl Fetcher {
	pub fn new(search: Arc<SearchService>, group_limit: u32) -> Self {
		Self {
			search,
			group_limit,
		}
	}

	pub fn group_limit(&self) -> u32 {
		self.group_limit
	}

	/// Forces the pickup shipment method when the context asks for it.
	pub fn shape_page_query(context: &QueryContext, query: PageQuery) -> PageQuery {
		if context.pickup_only() {
			query.with_input_field(SHIPMENT_METHOD_FIELD, STORE_PICKUP)
		} else {
			query
		}
	}

	/// Distinct order ids of a listing, in listing order.
	pub fn candidate_ids(list: &DocumentList) -> Vec<String> {
		let mut seen = HashSet::new();
		list.docs
			.iter()
			.filter_map(|doc| document_str(doc, ORDER_ID_FIELD))
			.filter(|id| !id.is_empty() && seen.insert(id.clone()))
			.collect()
	}

	/// Builds the grouped query pulling the item documents of `order_ids`.
	pub fn open_orders_query(&self, context: &QueryContext, order_ids: &[String]) -> SearchQuery {
		let id_filter = order_ids
			.iter()
			.map(|id| format!("{}: {}", ORDER_ID_FIELD, quote_term(id)))
			.collect::<Vec<_>>()
			.join(" OR ");

		let query = SearchQuery::match_all()
			.filter(id_filter)
			.filter("docType: ORDER")
			.rows(order_ids.len())
			.grouped_by(ORDER_ID_FIELD, self.group_limit);

		if context.pickup_only() {
			query.filter(format!("{}: {}", SHIPMENT_METHOD_FIELD, STORE_PICKUP))
		} else {
			query
		}
	}

	/// Fetches one page of open orders.
	///
	/// Returns `None` when the listing stage matched nothing or carried an
	/// error marker; the grouped stage is skipped in that case.
	pub async fn fetch_open(
		&self,
		context: &QueryContext,
		query: PageQuery,
	) -> Result<Option<OpenOrdersResponse>, SearchError> {
		let query = Self::shape_page_query(context, query);
		let listing = self.search.find_open_orders(&query).await?;

		if listing.is_empty_or_failed() {
			if let Some(error) = &listing.error {
				tracing::warn!(error = %error, "Open orders listing refused");
			}
			return Ok(None);
		}

		let order_ids = Self::candidate_ids(&listing);
		if order_ids.is_empty() {
			tracing::warn!(count = listing.count, "Open orders listing carried no order ids");
			return Ok(None);
		}

		let grouped = self
			.search
			.search_grouped(&self.open_orders_query(context, &order_ids))
			.await?;

		Ok(Some(OpenOrdersResponse {
			total: listing.count,
			grouped,
		}))
	}

	/// Fetches one page of packed orders.
	pub async fn fetch_packed(&self, query: PageQuery) -> Result<DocumentList, SearchError> {
		self.search.find_packed_orders(&query).await
	}

	/// Runs a single-order lookup.
	pub async fn fetch_order_detail(&self, query: &SearchQuery) -> Result<GroupedDocuments, SearchError> {
		self.search.search_grouped(query).await
	}
}
