//! Scripted backends and recording collaborators for unit tests.

use crate::sinks::{Collaborators, NotificationSink, ProductCatalog, ProgressSink, StockCache};
use async_trait::async_trait;
use fulfillment_config::Config;
use fulfillment_search::{SearchError, SearchInterface, SearchService};
use fulfillment_shipment::{ShipmentError, ShipmentInterface, ShipmentService};
use fulfillment_types::{
	ConfigSchema, Document, DocumentGroup, DocumentList, GroupedDocuments, Notice, OrderItem,
	OrderRecord, PageQuery, QuickShipRequest, RejectItemRequest, SearchQuery,
	ShipmentUpdateRequest, StatusReply, ValidationError,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn doc(value: Value) -> Document {
	match value {
		Value::Object(map) => map,
		other => panic!("expected a JSON object, got {}", other),
	}
}

pub fn order(order_id: &str) -> OrderRecord {
	OrderRecord {
		order_id: order_id.to_string(),
		..Default::default()
	}
}

/// Order with one item per `(product_id, shipment_method)` pair.
pub fn order_with_items(order_id: &str, items: &[(&str, &str)]) -> OrderRecord {
	OrderRecord {
		items: items
			.iter()
			.enumerate()
			.map(|(i, (product_id, method))| OrderItem {
				product_id: Some(product_id.to_string()),
				shipment_method_type_id: Some(method.to_string()),
				order_item_seq_id: Some(format!("{:05}", i + 1)),
				ship_group_seq_id: Some("00001".to_string()),
				..Default::default()
			})
			.collect(),
		..order(order_id)
	}
}

/// Order with one item per `(ship_group_seq_id, shipment_method)` pair.
pub fn order_in_groups(order_id: &str, groups: &[(&str, &str)]) -> OrderRecord {
	OrderRecord {
		items: groups
			.iter()
			.map(|(group, method)| OrderItem {
				shipment_method_type_id: Some(method.to_string()),
				order_item_seq_id: Some("00001".to_string()),
				ship_group_seq_id: Some(group.to_string()),
				..Default::default()
			})
			.collect(),
		..order(order_id)
	}
}

/// Lets detached tasks run to completion.
pub async fn settle() {
	for _ in 0..10 {
		tokio::task::yield_now().await;
	}
}

pub fn test_config(shipping_orders: bool) -> Config {
	format!(
		r#"
[client]
id = "store-test"
shipping_orders = {}
facility_id = "STORE_1"

[fetch]
view_size = 10
group_limit = 1000

[search]
primary = "http"
[search.implementations.http]
base_url = "http://localhost:8080/api"

[shipment]
primary = "http"
[shipment.implementations.http]
base_url = "http://localhost:8080/api"
"#,
		shipping_orders
	)
	.parse()
	.unwrap()
}

struct AcceptAll;

impl ConfigSchema for AcceptAll {
	fn validate(&self, _config: &toml::Value) -> Result<(), ValidationError> {
		Ok(())
	}
}

fn pop<T: Default, E>(queue: &Mutex<VecDeque<Result<T, E>>>) -> Result<T, E> {
	queue.lock().unwrap().pop_front().unwrap_or_else(|| Ok(T::default()))
}

#[derive(Default)]
struct SearchScript {
	open: Mutex<VecDeque<Result<DocumentList, SearchError>>>,
	packed: Mutex<VecDeque<Result<DocumentList, SearchError>>>,
	grouped: Mutex<VecDeque<Result<GroupedDocuments, SearchError>>>,
	open_queries: Mutex<Vec<PageQuery>>,
	packed_queries: Mutex<Vec<PageQuery>>,
	grouped_queries: Mutex<Vec<SearchQuery>>,
}

/// Search backend answering from scripted queues and recording queries.
///
/// An exhausted queue answers with an empty response.
#[derive(Clone, Default)]
pub struct FakeSearch {
	script: Arc<SearchScript>,
}

impl FakeSearch {
	pub fn service(&self) -> Arc<SearchService> {
		Arc::new(SearchService::new(Box::new(self.clone())))
	}

	pub fn push_open(&self, list: DocumentList) {
		self.script.open.lock().unwrap().push_back(Ok(list));
	}

	pub fn push_open_error(&self, error: SearchError) {
		self.script.open.lock().unwrap().push_back(Err(error));
	}

	pub fn push_packed(&self, list: DocumentList) {
		self.script.packed.lock().unwrap().push_back(Ok(list));
	}

	pub fn push_grouped(&self, grouped: GroupedDocuments) {
		self.script.grouped.lock().unwrap().push_back(Ok(grouped));
	}

	pub fn push_grouped_error(&self, error: SearchError) {
		self.script.grouped.lock().unwrap().push_back(Err(error));
	}

	pub fn open_queries(&self) -> Vec<PageQuery> {
		self.script.open_queries.lock().unwrap().clone()
	}

	pub fn grouped_queries(&self) -> Vec<SearchQuery> {
		self.script.grouped_queries.lock().unwrap().clone()
	}

	pub fn grouped_calls(&self) -> usize {
		self.script.grouped_queries.lock().unwrap().len()
	}

	/// Grouped response with one group per `(order_id, docs)` pair.
	pub fn groups(groups: &[(&str, Vec<Value>)]) -> GroupedDocuments {
		GroupedDocuments {
			ngroups: Some(groups.len() as u64),
			groups: groups
				.iter()
				.map(|(order_id, docs)| DocumentGroup {
					group_value: Some(order_id.to_string()),
					docs: docs.iter().cloned().map(doc).collect(),
				})
				.collect(),
			error: None,
		}
	}
}

#[async_trait]
impl SearchInterface for FakeSearch {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(AcceptAll)
	}

	async fn find_open_orders(&self, query: &PageQuery) -> Result<DocumentList, SearchError> {
		self.script.open_queries.lock().unwrap().push(query.clone());
		pop(&self.script.open)
	}

	async fn find_packed_orders(&self, query: &PageQuery) -> Result<DocumentList, SearchError> {
		self.script.packed_queries.lock().unwrap().push(query.clone());
		pop(&self.script.packed)
	}

	async fn search_grouped(&self, query: &SearchQuery) -> Result<GroupedDocuments, SearchError> {
		self.script.grouped_queries.lock().unwrap().push(query.clone());
		pop(&self.script.grouped)
	}
}

#[derive(Default)]
struct ShipmentScript {
	reject: Mutex<VecDeque<Result<StatusReply, ShipmentError>>>,
	quick_ship: Mutex<VecDeque<Result<StatusReply, ShipmentError>>>,
	update: Mutex<VecDeque<Result<StatusReply, ShipmentError>>>,
	reject_requests: Mutex<Vec<RejectItemRequest>>,
	quick_ship_requests: Mutex<Vec<QuickShipRequest>>,
	update_requests: Mutex<Vec<ShipmentUpdateRequest>>,
}

/// Status-change backend answering from scripted queues.
///
/// An exhausted queue answers with an empty successful reply.
#[derive(Clone, Default)]
pub struct FakeShipment {
	script: Arc<ShipmentScript>,
}

impl FakeShipment {
	pub fn service(&self) -> Arc<ShipmentService> {
		Arc::new(ShipmentService::new(Box::new(self.clone())))
	}

	pub fn push_reject(&self, reply: Result<StatusReply, ShipmentError>) {
		self.script.reject.lock().unwrap().push_back(reply);
	}

	pub fn push_quick_ship(&self, reply: Result<StatusReply, ShipmentError>) {
		self.script.quick_ship.lock().unwrap().push_back(reply);
	}

	pub fn push_update(&self, reply: Result<StatusReply, ShipmentError>) {
		self.script.update.lock().unwrap().push_back(reply);
	}

	pub fn reject_requests(&self) -> Vec<RejectItemRequest> {
		self.script.reject_requests.lock().unwrap().clone()
	}

	pub fn quick_ship_requests(&self) -> Vec<QuickShipRequest> {
		self.script.quick_ship_requests.lock().unwrap().clone()
	}

	pub fn update_requests(&self) -> Vec<ShipmentUpdateRequest> {
		self.script.update_requests.lock().unwrap().clone()
	}
}

#[async_trait]
impl ShipmentInterface for FakeShipment {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(AcceptAll)
	}

	async fn reject_order_item(&self, request: &RejectItemRequest) -> Result<StatusReply, ShipmentError> {
		self.script.reject_requests.lock().unwrap().push(request.clone());
		pop(&self.script.reject)
	}

	async fn quick_ship_entire_ship_group(
		&self,
		request: &QuickShipRequest,
	) -> Result<StatusReply, ShipmentError> {
		self.script
			.quick_ship_requests
			.lock()
			.unwrap()
			.push(request.clone());
		pop(&self.script.quick_ship)
	}

	async fn update_shipment(&self, request: &ShipmentUpdateRequest) -> Result<StatusReply, ShipmentError> {
		self.script.update_requests.lock().unwrap().push(request.clone());
		pop(&self.script.update)
	}
}

#[derive(Default)]
struct Recorded {
	notices: Mutex<Vec<Notice>>,
	starts: AtomicUsize,
	stops: AtomicUsize,
	products: Mutex<Vec<Vec<String>>>,
	stock: Mutex<Vec<Vec<String>>>,
}

impl NotificationSink for Recorded {
	fn notify(&self, notice: &Notice) {
		self.notices.lock().unwrap().push(notice.clone());
	}
}

impl ProgressSink for Recorded {
	fn start(&self) {
		self.starts.fetch_add(1, Ordering::SeqCst);
	}

	fn stop(&self) {
		self.stops.fetch_add(1, Ordering::SeqCst);
	}
}

#[async_trait]
impl ProductCatalog for Recorded {
	async fn fetch_products(&self, product_ids: Vec<String>) {
		self.products.lock().unwrap().push(product_ids);
	}
}

#[async_trait]
impl StockCache for Recorded {
	async fn add_products(&self, product_ids: Vec<String>) {
		self.stock.lock().unwrap().push(product_ids);
	}
}

/// Collaborators recording everything they are handed.
#[derive(Clone, Default)]
pub struct RecordingSinks {
	recorded: Arc<Recorded>,
}

impl RecordingSinks {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn collaborators(&self) -> Collaborators {
		Collaborators {
			notifier: self.recorded.clone(),
			progress: self.recorded.clone(),
			products: self.recorded.clone(),
			stock: self.recorded.clone(),
		}
	}

	pub fn notices(&self) -> Vec<Notice> {
		self.recorded.notices.lock().unwrap().clone()
	}

	pub fn progress_starts(&self) -> usize {
		self.recorded.starts.load(Ordering::SeqCst)
	}

	pub fn progress_stops(&self) -> usize {
		self.recorded.stops.load(Ordering::SeqCst)
	}

	pub fn product_requests(&self) -> Vec<Vec<String>> {
		self.recorded.products.lock().unwrap().clone()
	}

	pub fn stock_requests(&self) -> Vec<Vec<String>> {
		self.recorded.stock.lock().unwrap().clone()
	}
}
