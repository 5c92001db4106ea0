//! Fulfillment engine exposing the client-side order operations.
//!
//! The engine composes the fetcher, list store and handlers, and is the only
//! place that turns outcomes into user-facing notices, progress signals and
//! bus events. Every backend failure is caught here, logged and reported as
//! a notice before the error is handed back to the caller.

pub mod context;
pub mod event_bus;

use crate::error::FulfillmentError;
use crate::fetcher::Fetcher;
use crate::handlers::{
	BatchItemUpdater, BatchOutcome, DetailResolver, DetailSource, ResolvedDetail, ShipOutcome,
};
use crate::normalizer::{self, Normalized};
use crate::sinks::Collaborators;
use crate::state::{ListStore, MergeGate};
use context::QueryContext;
use event_bus::EventBus;
use fulfillment_config::Config;
use fulfillment_search::SearchService;
use fulfillment_shipment::ShipmentService;
use fulfillment_types::{
	truncate_id, FulfillmentEvent, Notice, OrderCollection, OrderRecord, PageQuery,
	PagedOrderList, RejectItem, SearchQuery, ShipmentStatus, StatusReply,
};
use std::sync::Arc;
use tracing::instrument;

/// Main engine behind the exposed fulfillment operations.
///
/// Operations must be awaited on a Tokio runtime; cache hydration is spawned
/// on the runtime that drives them.
pub struct FulfillmentEngine {
	/// Client configuration.
	config: Config,
	/// Preferences shaping every open orders query.
	context: QueryContext,
	/// Open, packed and current order state.
	store: Arc<ListStore>,
	/// Search backend queries.
	fetcher: Arc<Fetcher>,
	/// Single-order resolution.
	detail: DetailResolver,
	/// Status changes.
	batch: BatchItemUpdater,
	/// Notices, progress and cache hydration.
	collaborators: Collaborators,
	/// State change notifications.
	event_bus: EventBus,
}

impl FulfillmentEngine {
	/// Creates a new engine over the given backends.
	pub fn new(
		config: Config,
		search: Arc<SearchService>,
		shipment: Arc<ShipmentService>,
		collaborators: Collaborators,
		event_bus: EventBus,
	) -> Self {
		let context = QueryContext::from(&config.client);
		let store = Arc::new(ListStore::new());
		let fetcher = Arc::new(Fetcher::new(search, config.fetch.group_limit));
		let detail = DetailResolver::new(fetcher.clone(), store.clone(), collaborators.clone());
		let batch = BatchItemUpdater::new(shipment);

		Self {
			config,
			context,
			store,
			fetcher,
			detail,
			batch,
			collaborators,
			event_bus,
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	/// Returns the query context used for open orders.
	pub fn context(&self) -> QueryContext {
		self.context
	}

	/// Overrides the shipping-orders preference for subsequent queries.
	pub fn set_context(&mut self, context: QueryContext) {
		self.context = context;
	}

	/// First-page query using the configured page size and facility.
	pub fn first_page(&self) -> PageQuery {
		self.page(0)
	}

	/// Query for page `view_index` using the configured page size and facility.
	pub fn page(&self, view_index: u32) -> PageQuery {
		self.scoped(PageQuery::new(self.config.fetch.view_size, view_index))
	}

	fn scoped(&self, mut query: PageQuery) -> PageQuery {
		if query.facility_id.is_none() {
			query.facility_id = self.config.client.facility_id.clone();
		}
		query
	}

	/// Snapshot of a collection.
	pub async fn collection(&self, collection: OrderCollection) -> PagedOrderList {
		self.store.get_collection(collection).await
	}

	pub async fn current(&self) -> Option<OrderRecord> {
		self.store.current().await
	}

	/// Fetches a page of open orders and merges it into the open collection.
	///
	/// Page 0 replaces the collection and later pages append to it. An empty
	/// or refused response empties the collection. A transport failure
	/// leaves it unchanged.
	#[instrument(skip_all, fields(page = query.view_index))]
	pub async fn fetch_open_page(&self, query: PageQuery) -> Result<PagedOrderList, FulfillmentError> {
		let _progress = self.collaborators.progress(query.is_first_page());
		let page_index = query.view_index;
		let query = self.scoped(query);

		let gate = self.store.begin_merge(OrderCollection::Open).await;
		let response = match self.fetcher.fetch_open(&self.context, query).await {
			Ok(response) => response,
			Err(e) => return Err(self.transport_failure(gate, e.into())),
		};

		let page = response.and_then(|response| {
			if response.grouped.is_empty_or_failed() {
				if let Some(error) = &response.grouped.error {
					tracing::warn!(error = %error, "Open orders query refused");
				}
				return None;
			}
			Some((normalizer::normalize(&response.grouped), response.total))
		});

		match page {
			Some((normalized, total)) => self.commit(gate, page_index, normalized, total, true).await,
			None => self.commit_empty(gate).await,
		}
		Ok(self.store.get_collection(OrderCollection::Open).await)
	}

	/// Fetches a page of packed orders and merges it into the packed collection.
	#[instrument(skip_all, fields(page = query.view_index))]
	pub async fn fetch_packed_page(&self, query: PageQuery) -> Result<PagedOrderList, FulfillmentError> {
		let _progress = self.collaborators.progress(query.is_first_page());
		let page_index = query.view_index;
		let query = self.scoped(query);

		let gate = self.store.begin_merge(OrderCollection::Packed).await;
		let list = match self.fetcher.fetch_packed(query).await {
			Ok(list) => list,
			Err(e) => return Err(self.transport_failure(gate, e.into())),
		};

		if list.is_empty_or_failed() {
			if let Some(error) = &list.error {
				tracing::warn!(error = %error, "Packed orders query refused");
			}
			self.commit_empty(gate).await;
		} else {
			let total = list.count;
			self.commit(gate, page_index, normalizer::normalize_flat(&list), total, false)
				.await;
		}
		Ok(self.store.get_collection(OrderCollection::Packed).await)
	}

	async fn commit(
		&self,
		gate: MergeGate<'_>,
		page_index: u32,
		normalized: Normalized,
		total: u64,
		with_stock: bool,
	) {
		let collection = gate.collection();
		self.collaborators.hydrate(normalized.product_ids, with_stock);
		let loaded = gate
			.replace_or_append(page_index, normalized.orders, total)
			.await;

		tracing::info!(collection = %collection, loaded, total, "Updated orders");
		self.event_bus
			.publish(FulfillmentEvent::CollectionUpdated {
				collection,
				loaded,
				total,
			})
			.ok();
	}

	async fn commit_empty(&self, gate: MergeGate<'_>) {
		let collection = gate.collection();
		gate.replace_or_append(0, Vec::new(), 0).await;

		tracing::info!(collection = %collection, "No orders found");
		self.collaborators.notify(Notice::OrdersNotFound);
		self.event_bus
			.publish(FulfillmentEvent::CollectionUpdated {
				collection,
				loaded: 0,
				total: 0,
			})
			.ok();
	}

	fn transport_failure(&self, gate: MergeGate<'_>, error: FulfillmentError) -> FulfillmentError {
		tracing::error!(collection = %gate.collection(), error = %error, "Failed to fetch orders");
		gate.abandon();
		self.collaborators.notify(Notice::SomethingWentWrong);
		error
	}

	/// Resolves an order and makes it the current order.
	///
	/// Items are restricted to `shipment_method` unless the order already is
	/// the current order. `query` overrides the backend lookup.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn resolve_detail(
		&self,
		order_id: &str,
		shipment_method: &str,
		query: Option<SearchQuery>,
	) -> Result<ResolvedDetail, FulfillmentError> {
		match self.detail.resolve(order_id, shipment_method, query).await {
			Ok(resolved) => {
				if resolved.source != DetailSource::Current {
					self.event_bus
						.publish(FulfillmentEvent::CurrentOrderUpdated {
							order_id: resolved.order.order_id.clone(),
							items: resolved.order.items.len(),
						})
						.ok();
				}
				Ok(resolved)
			},
			Err(FulfillmentError::NotFound(id)) => {
				tracing::info!("Order not found");
				self.collaborators.notify(Notice::OrderNotFound);
				Err(FulfillmentError::NotFound(id))
			},
			Err(e) => {
				tracing::error!(error = %e, "Failed to resolve order");
				self.collaborators.notify(Notice::SomethingWentWrong);
				Err(e)
			},
		}
	}

	/// Rejects items of an order, one request per item.
	///
	/// The batch counts as successful when at least one item was rejected.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn reject_items(&self, order_id: &str, items: &[RejectItem]) -> BatchOutcome {
		let _progress = self.collaborators.progress(true);
		let outcome = self.batch.reject_items(order_id, items).await;

		if outcome.overall_succeeded {
			self.collaborators.notify(Notice::ItemsCanceled {
				order_id: order_id.to_string(),
			});
		} else {
			self.collaborators.notify(Notice::SomethingWentWrong);
		}

		self.event_bus
			.publish(FulfillmentEvent::ItemsRejected {
				order_id: order_id.to_string(),
				submitted: outcome.results.len(),
				failed: outcome.failed_count(),
			})
			.ok();
		outcome
	}

	/// Ships a ship group of `order` and packs the created shipment.
	///
	/// `facility_id` falls back to the configured facility.
	#[instrument(skip_all, fields(order_id = %truncate_id(&order.order_id), ship_group = %ship_group_seq_id))]
	pub async fn quick_ship_group(
		&self,
		order: &OrderRecord,
		ship_group_seq_id: &str,
		facility_id: Option<String>,
	) -> Result<ShipOutcome, FulfillmentError> {
		let _progress = self.collaborators.progress(true);
		let facility_id = facility_id.or_else(|| self.config.client.facility_id.clone());

		let outcome = match self
			.batch
			.quick_ship_group(order, ship_group_seq_id, facility_id)
			.await
		{
			Ok(outcome) => outcome,
			Err(e) => {
				tracing::error!(error = %e, "Failed to ship ship group");
				self.collaborators.notify(Notice::SomethingWentWrong);
				return Err(e);
			},
		};

		match &outcome {
			ShipOutcome::Refused { reason } => {
				tracing::warn!(reason = %reason, "Ship group refused");
				self.collaborators.notify(Notice::SomethingWentWrong);
				return Ok(outcome);
			},
			ShipOutcome::PackFailed { .. } => {
				self.collaborators.notify(Notice::SomethingWentWrong);
			},
			ShipOutcome::Packed { shipment_id } => {
				self.event_bus
					.publish(FulfillmentEvent::ShipmentStatusChanged {
						shipment_id: shipment_id.clone(),
						status: ShipmentStatus::Packed,
					})
					.ok();
			},
			ShipOutcome::Shipped { .. } => {},
		}

		tracing::info!("Ship group shipped");
		self.collaborators.notify(Notice::OrderPackedForDelivery);
		self.event_bus
			.publish(FulfillmentEvent::ShipGroupShipped {
				order_id: order.order_id.clone(),
				ship_group_seq_id: ship_group_seq_id.to_string(),
			})
			.ok();
		Ok(outcome)
	}

	/// Marks a shipment packed.
	#[instrument(skip_all, fields(shipment_id = %shipment_id))]
	pub async fn pack_items(&self, shipment_id: &str) -> Result<StatusReply, FulfillmentError> {
		self.change_shipment_status(shipment_id, ShipmentStatus::Packed)
			.await
	}

	/// Marks a shipment shipped and notifies that it reached its customer.
	#[instrument(skip_all, fields(shipment_id = %shipment_id))]
	pub async fn deliver_shipment(
		&self,
		shipment_id: &str,
		customer_name: &str,
	) -> Result<StatusReply, FulfillmentError> {
		let _progress = self.collaborators.progress(true);
		let result = self
			.change_shipment_status(shipment_id, ShipmentStatus::Shipped)
			.await;

		match &result {
			Ok(reply) if !reply.has_error() => {
				self.collaborators.notify(Notice::OrderDeliveredTo {
					customer_name: customer_name.to_string(),
				});
			},
			_ => self.collaborators.notify(Notice::SomethingWentWrong),
		}
		result
	}

	async fn change_shipment_status(
		&self,
		shipment_id: &str,
		status: ShipmentStatus,
	) -> Result<StatusReply, FulfillmentError> {
		let reply = self
			.batch
			.update_shipment(shipment_id, status)
			.await
			.inspect_err(|e| tracing::error!(error = %e, status = %status, "Failed to update shipment"))?;

		match &reply.error {
			Some(error) => {
				tracing::warn!(error = %error, status = %status, "Shipment update refused");
			},
			None => {
				tracing::info!(status = %status, "Updated shipment");
				self.event_bus
					.publish(FulfillmentEvent::ShipmentStatusChanged {
						shipment_id: shipment_id.to_string(),
						status,
					})
					.ok();
			},
		}
		Ok(reply)
	}

	/// Empties the open and packed collections. The current order is kept.
	pub async fn clear_all(&self) {
		self.store.clear().await;
		tracing::info!("Cleared order collections");

		for collection in OrderCollection::all() {
			self.event_bus
				.publish(FulfillmentEvent::CollectionUpdated {
					collection,
					loaded: 0,
					total: 0,
				})
				.ok();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{order_in_groups, settle, test_config, FakeSearch, FakeShipment, RecordingSinks};
	use fulfillment_search::SearchError;
	use fulfillment_shipment::ShipmentError;
	use fulfillment_types::{DocumentList, GroupedDocuments, STORE_PICKUP};
	use serde_json::json;

	struct Harness {
		search: FakeSearch,
		shipment: FakeShipment,
		sinks: RecordingSinks,
		engine: FulfillmentEngine,
	}

	fn harness_with(shipping_orders: bool) -> Harness {
		let search = FakeSearch::default();
		let shipment = FakeShipment::default();
		let sinks = RecordingSinks::new();
		let engine = FulfillmentEngine::new(
			test_config(shipping_orders),
			search.service(),
			shipment.service(),
			sinks.collaborators(),
			EventBus::default(),
		);
		Harness {
			search,
			shipment,
			sinks,
			engine,
		}
	}

	fn harness() -> Harness {
		harness_with(true)
	}

	fn listing(ids: &[&str], count: u64) -> DocumentList {
		DocumentList {
			count,
			docs: ids
				.iter()
				.map(|id| crate::test_support::doc(json!({ "orderId": id })))
				.collect(),
			error: None,
		}
	}

	#[tokio::test]
	async fn test_first_page_scenario() {
		let h = harness();
		h.search.push_open(listing(&["1001"], 1));
		h.search.push_grouped(FakeSearch::groups(&[(
			"1001",
			vec![json!({ "orderId": "1001", "orderStatusId": "OPEN", "productId": "P1" })],
		)]));

		let open = h.engine.fetch_open_page(h.engine.first_page()).await.unwrap();
		settle().await;

		assert_eq!(open.total, 1);
		assert_eq!(open.list.len(), 1);
		assert_eq!(open.list[0].order_id, "1001");
		assert_eq!(open.list[0].status_id.as_deref(), Some("OPEN"));
		assert_eq!(open.list[0].items.len(), 1);
		assert_eq!(h.sinks.product_requests(), vec![vec!["P1".to_string()]]);
		assert_eq!(h.sinks.stock_requests(), vec![vec!["P1".to_string()]]);
		assert_eq!(h.sinks.progress_starts(), 1);
		assert_eq!(h.sinks.progress_stops(), 1);
		assert!(h.sinks.notices().is_empty());
	}

	#[tokio::test]
	async fn test_next_page_appends_without_progress() {
		let h = harness();
		h.search.push_open(listing(&["1001"], 2));
		h.search.push_grouped(FakeSearch::groups(&[("1001", vec![json!({ "orderId": "1001" })])]));
		h.search.push_open(listing(&["1002"], 2));
		h.search.push_grouped(FakeSearch::groups(&[("1002", vec![json!({ "orderId": "1002" })])]));

		h.engine.fetch_open_page(h.engine.page(0)).await.unwrap();
		let open = h.engine.fetch_open_page(h.engine.page(1)).await.unwrap();

		let ids: Vec<_> = open.list.iter().map(|o| o.order_id.as_str()).collect();
		assert_eq!(ids, vec!["1001", "1002"]);
		assert_eq!(open.total, 2);
		assert_eq!(h.sinks.progress_starts(), 1);
		assert_eq!(h.sinks.progress_stops(), 1);
	}

	#[tokio::test]
	async fn test_incremental_pages_leave_progress_balanced() {
		let h = harness();
		for (page, order_id) in [(0, "2001"), (1, "2002"), (2, "2003")] {
			h.search.push_packed(DocumentList {
				count: 3,
				docs: vec![crate::test_support::doc(json!({ "orderId": order_id }))],
				error: None,
			});
			h.engine.fetch_packed_page(h.engine.page(page)).await.unwrap();
		}
		h.search.push_open_error(SearchError::Network("connection refused".into()));
		h.engine.fetch_open_page(h.engine.page(1)).await.unwrap_err();

		assert_eq!(h.engine.collection(OrderCollection::Packed).await.list.len(), 3);
		assert_eq!(h.sinks.progress_starts(), 1);
		assert_eq!(h.sinks.progress_stops(), 1);
	}

	#[tokio::test]
	async fn test_empty_groups_commit_empty_and_notify() {
		let h = harness();
		h.search.push_open(listing(&["1001"], 1));
		h.search.push_grouped(FakeSearch::groups(&[("1001", vec![json!({ "orderId": "1001" })])]));
		h.engine.fetch_open_page(h.engine.page(0)).await.unwrap();

		h.search.push_open(listing(&["1002"], 1));
		h.search.push_grouped(GroupedDocuments::default());
		let open = h.engine.fetch_open_page(h.engine.page(1)).await.unwrap();

		assert_eq!(open, PagedOrderList::default());
		assert_eq!(h.sinks.notices(), vec![Notice::OrdersNotFound]);
	}

	#[tokio::test]
	async fn test_empty_listing_makes_no_grouped_call() {
		let h = harness();
		h.search.push_open(DocumentList::default());

		let open = h.engine.fetch_open_page(h.engine.first_page()).await.unwrap();

		assert!(open.is_empty());
		assert_eq!(h.search.grouped_calls(), 0);
		assert_eq!(h.sinks.notices(), vec![Notice::OrdersNotFound]);
		assert_eq!(h.sinks.progress_stops(), 1);
	}

	#[tokio::test]
	async fn test_transport_failure_leaves_state() {
		let h = harness();
		h.search.push_open(listing(&["1001"], 1));
		h.search.push_grouped(FakeSearch::groups(&[("1001", vec![json!({ "orderId": "1001" })])]));
		h.engine.fetch_open_page(h.engine.page(0)).await.unwrap();

		h.search.push_open_error(SearchError::Network("connection refused".into()));
		let err = h.engine.fetch_open_page(h.engine.page(0)).await.unwrap_err();

		assert!(matches!(err, FulfillmentError::Transport(_)));
		assert_eq!(h.engine.collection(OrderCollection::Open).await.list.len(), 1);
		assert_eq!(h.sinks.notices(), vec![Notice::SomethingWentWrong]);
		assert_eq!(h.sinks.progress_stops(), 2);
	}

	#[tokio::test]
	async fn test_pickup_only_client_shapes_both_stages() {
		let h = harness_with(false);
		h.search.push_open(listing(&["1001"], 1));
		h.search.push_grouped(FakeSearch::groups(&[("1001", vec![json!({ "orderId": "1001" })])]));

		h.engine.fetch_open_page(h.engine.first_page()).await.unwrap();

		let page = &h.search.open_queries()[0];
		assert_eq!(page.input_fields.get("shipmentMethodTypeId"), Some(&json!(STORE_PICKUP)));
		assert_eq!(page.facility_id.as_deref(), Some("STORE_1"));
		let grouped = &h.search.grouped_queries()[0];
		assert!(grouped
			.filters
			.contains(&"shipmentMethodTypeId: STOREPICKUP".to_string()));
	}

	#[tokio::test]
	async fn test_packed_page_hydrates_products_only() {
		let h = harness();
		h.search.push_packed(DocumentList {
			count: 30,
			docs: vec![crate::test_support::doc(json!({
				"orderId": "2001",
				"shipmentId": "10020",
				"items": [{ "productId": "P7" }]
			}))],
			error: None,
		});

		let packed = h.engine.fetch_packed_page(h.engine.first_page()).await.unwrap();
		settle().await;

		assert_eq!(packed.total, 30);
		assert_eq!(packed.list[0].attribute_str("shipmentId").as_deref(), Some("10020"));
		assert_eq!(h.sinks.product_requests(), vec![vec!["P7".to_string()]]);
		assert!(h.sinks.stock_requests().is_empty());
		assert!(h.engine.collection(OrderCollection::Open).await.is_empty());
	}

	#[tokio::test]
	async fn test_packed_error_marker_commits_empty() {
		let h = harness();
		h.search.push_packed(DocumentList {
			count: 3,
			docs: Vec::new(),
			error: Some("Invalid facility".into()),
		});

		let packed = h.engine.fetch_packed_page(h.engine.first_page()).await.unwrap();

		assert_eq!(packed, PagedOrderList::default());
		assert_eq!(h.sinks.notices(), vec![Notice::OrdersNotFound]);
	}

	#[tokio::test]
	async fn test_resolve_detail_not_found_notice() {
		let h = harness();
		h.search.push_grouped(GroupedDocuments::default());

		let err = h
			.engine
			.resolve_detail("1001", STORE_PICKUP, None)
			.await
			.unwrap_err();

		assert!(matches!(err, FulfillmentError::NotFound(_)));
		assert_eq!(h.sinks.notices(), vec![Notice::OrderNotFound]);
		assert!(h.engine.current().await.is_none());
	}

	#[tokio::test]
	async fn test_resolve_detail_publishes_current() {
		let h = harness();
		let mut events = h.engine.event_bus().subscribe();
		h.search.push_grouped(FakeSearch::groups(&[(
			"1001",
			vec![json!({ "orderId": "1001", "shipmentMethodTypeId": "STOREPICKUP" })],
		)]));

		h.engine.resolve_detail("1001", STORE_PICKUP, None).await.unwrap();

		assert_eq!(
			events.recv().await.unwrap(),
			FulfillmentEvent::CurrentOrderUpdated {
				order_id: "1001".into(),
				items: 1
			}
		);
	}

	#[tokio::test]
	async fn test_reject_items_notices() {
		let h = harness();
		h.shipment.push_reject(Err(ShipmentError::Network("reset".into())));
		h.shipment.push_reject(Ok(StatusReply::event("Rejected")));
		let items = vec![
			RejectItem {
				reason: "NOT_IN_STOCK".into(),
				facility_id: None,
				order_item_seq_id: "00001".into(),
				shipment_method_type_id: None,
				quantity: json!(1),
			},
			RejectItem {
				reason: "NOT_IN_STOCK".into(),
				facility_id: None,
				order_item_seq_id: "00002".into(),
				shipment_method_type_id: None,
				quantity: json!("1"),
			},
		];

		let outcome = h.engine.reject_items("1001", &items).await;

		assert!(outcome.overall_succeeded);
		assert_eq!(outcome.results.len(), 2);
		assert_eq!(
			h.sinks.notices(),
			vec![Notice::ItemsCanceled {
				order_id: "1001".into()
			}]
		);
		assert_eq!(h.sinks.progress_starts(), 1);
		assert_eq!(h.sinks.progress_stops(), 1);
	}

	#[tokio::test]
	async fn test_reject_items_all_failed() {
		let h = harness();
		h.shipment.push_reject(Ok(StatusReply::failed("Not editable")));
		let items = vec![RejectItem {
			reason: "NOT_IN_STOCK".into(),
			facility_id: None,
			order_item_seq_id: "00001".into(),
			shipment_method_type_id: None,
			quantity: json!(1),
		}];

		let outcome = h.engine.reject_items("1001", &items).await;

		assert!(!outcome.overall_succeeded);
		assert_eq!(h.sinks.notices(), vec![Notice::SomethingWentWrong]);
	}

	#[tokio::test]
	async fn test_quick_ship_uses_configured_facility() {
		let h = harness();
		h.shipment.push_quick_ship(Ok(StatusReply::event("Shipment 10020 created")));
		h.shipment.push_update(Ok(StatusReply::event("Packed")));
		let order = order_in_groups("1001", &[("00001", "STANDARD")]);

		let outcome = h.engine.quick_ship_group(&order, "00001", None).await.unwrap();

		assert!(matches!(outcome, ShipOutcome::Packed { .. }));
		assert_eq!(
			h.shipment.quick_ship_requests()[0].facility_id.as_deref(),
			Some("STORE_1")
		);
		assert_eq!(h.sinks.notices(), vec![Notice::OrderPackedForDelivery]);
	}

	#[tokio::test]
	async fn test_quick_ship_pack_failure_notices() {
		let h = harness();
		h.shipment.push_quick_ship(Ok(StatusReply::event("Shipment 10020 created")));
		h.shipment.push_update(Ok(StatusReply::failed("Shipment locked")));
		let order = order_in_groups("1001", &[("00001", "STANDARD")]);

		let outcome = h.engine.quick_ship_group(&order, "00001", None).await.unwrap();

		assert!(matches!(outcome, ShipOutcome::PackFailed { .. }));
		assert_eq!(
			h.sinks.notices(),
			vec![Notice::SomethingWentWrong, Notice::OrderPackedForDelivery]
		);
	}

	#[tokio::test]
	async fn test_quick_ship_transport_failure() {
		let h = harness();
		h.shipment
			.push_quick_ship(Err(ShipmentError::Network("reset".into())));
		let order = order_in_groups("1001", &[("00001", "STANDARD")]);

		let err = h.engine.quick_ship_group(&order, "00001", None).await.unwrap_err();

		assert!(matches!(err, FulfillmentError::Transport(_)));
		assert_eq!(h.sinks.notices(), vec![Notice::SomethingWentWrong]);
		assert_eq!(h.sinks.progress_stops(), 1);
	}

	#[tokio::test]
	async fn test_deliver_shipment() {
		let h = harness();
		h.shipment.push_update(Ok(StatusReply::event("Updated")));

		h.engine.deliver_shipment("10020", "Ada Lovelace").await.unwrap();

		assert_eq!(h.shipment.update_requests()[0].status, ShipmentStatus::Shipped);
		assert_eq!(
			h.sinks.notices(),
			vec![Notice::OrderDeliveredTo {
				customer_name: "Ada Lovelace".into()
			}]
		);
	}

	#[tokio::test]
	async fn test_deliver_shipment_refused() {
		let h = harness();
		h.shipment.push_update(Ok(StatusReply::failed("Not packed")));

		let reply = h.engine.deliver_shipment("10020", "Ada Lovelace").await.unwrap();

		assert!(reply.has_error());
		assert_eq!(h.sinks.notices(), vec![Notice::SomethingWentWrong]);
	}

	#[tokio::test]
	async fn test_pack_items_has_no_notice() {
		let h = harness();
		h.shipment.push_update(Ok(StatusReply::event("Packed")));

		let reply = h.engine.pack_items("10020").await.unwrap();

		assert!(!reply.has_error());
		assert_eq!(h.shipment.update_requests()[0].status, ShipmentStatus::Packed);
		assert!(h.sinks.notices().is_empty());
	}

	#[tokio::test]
	async fn test_clear_all() {
		let h = harness();
		h.search.push_open(listing(&["1001"], 1));
		h.search.push_grouped(FakeSearch::groups(&[(
			"1001",
			vec![json!({ "orderId": "1001", "shipmentMethodTypeId": "STOREPICKUP" })],
		)]));
		h.engine.fetch_open_page(h.engine.first_page()).await.unwrap();
		h.engine.resolve_detail("1001", STORE_PICKUP, None).await.unwrap();

		h.engine.clear_all().await;

		assert!(h.engine.collection(OrderCollection::Open).await.is_empty());
		assert_eq!(h.engine.collection(OrderCollection::Open).await.total, 0);
		assert!(h.engine.collection(OrderCollection::Packed).await.is_empty());
		assert!(h.engine.current().await.is_some());
	}
}
