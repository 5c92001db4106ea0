//! Paginated order collections and the current order slot.

use fulfillment_types::{OrderCollection, OrderRecord, PagedOrderList};
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// One paginated collection and the gate serializing writers to it.
#[derive(Default)]
struct Collection {
	gate: Mutex<()>,
	data: RwLock<PagedOrderList>,
}

/// Holds the open and packed collections plus the current order.
///
/// Readers never wait on the writer gate, only on the short data lock.
#[derive(Default)]
pub struct ListStore {
	open: Collection,
	packed: Collection,
	current: RwLock<Option<OrderRecord>>,
}

/// Exclusive right to merge into one collection.
///
/// Obtained before a fetch is dispatched and consumed by the commit, so
/// that a merge can never be overtaken by one whose fetch started later.
/// The gate is a FIFO mutex; waiters are admitted in arrival order.
pub struct MergeGate<'a> {
	collection: OrderCollection,
	target: &'a Collection,
	_permit: MutexGuard<'a, ()>,
}

impl MergeGate<'_> {
	pub fn collection(&self) -> OrderCollection {
		self.collection
	}

	/// Replaces the list on page 0 and appends otherwise.
	///
	/// `total` always overwrites the previous total. Returns the number of
	/// orders held after the merge.
	pub async fn replace_or_append(self, page_index: u32, orders: Vec<OrderRecord>, total: u64) -> usize {
		let mut data = self.target.data.write().await;
		if page_index == 0 {
			data.list = orders;
		} else {
			data.list.extend(orders);
		}
		data.total = total;

		tracing::debug!(
			collection = %self.collection,
			page_index,
			loaded = data.list.len(),
			total,
			"Merged page"
		);
		data.list.len()
	}

	/// Leaves the collection unchanged and releases the gate.
	pub fn abandon(self) {}
}

impl ListStore {
	pub fn new() -> Self {
		Self::default()
	}

	fn slot(&self, collection: OrderCollection) -> &Collection {
		match collection {
			OrderCollection::Open => &self.open,
			OrderCollection::Packed => &self.packed,
		}
	}

	/// Waits for the writer gate of `collection`.
	pub async fn begin_merge(&self, collection: OrderCollection) -> MergeGate<'_> {
		let target = self.slot(collection);
		MergeGate {
			collection,
			target,
			_permit: target.gate.lock().await,
		}
	}

	/// Merges a page into `collection`, waiting for earlier writers first.
	pub async fn replace_or_append(
		&self,
		collection: OrderCollection,
		page_index: u32,
		orders: Vec<OrderRecord>,
		total: u64,
	) -> usize {
		self.begin_merge(collection)
			.await
			.replace_or_append(page_index, orders, total)
			.await
	}

	/// Snapshot of a collection.
	pub async fn get_collection(&self, collection: OrderCollection) -> PagedOrderList {
		self.slot(collection).data.read().await.clone()
	}

	/// Finds an order in the open collection.
	pub async fn find_in_open(&self, order_id: &str) -> Option<OrderRecord> {
		self.open.data.read().await.find(order_id).cloned()
	}

	pub async fn current(&self) -> Option<OrderRecord> {
		self.current.read().await.clone()
	}

	/// Returns the current order if it has the given id.
	pub async fn current_if(&self, order_id: &str) -> Option<OrderRecord> {
		self.current
			.read()
			.await
			.as_ref()
			.filter(|order| order.order_id == order_id)
			.cloned()
	}

	/// Replaces the current order.
	pub async fn set_current(&self, order: OrderRecord) {
		*self.current.write().await = Some(order);
	}

	/// Empties both collections. The current order is kept.
	pub async fn clear(&self) {
		for collection in OrderCollection::all() {
			let gate = self.begin_merge(collection).await;
			*gate.target.data.write().await = PagedOrderList::default();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{order, settle};
	use std::sync::Arc;

	fn ids(list: &PagedOrderList) -> Vec<&str> {
		list.list.iter().map(|o| o.order_id.as_str()).collect()
	}

	#[tokio::test]
	async fn test_first_page_then_next_page_appends() {
		let store = ListStore::new();
		store
			.replace_or_append(OrderCollection::Open, 0, vec![order("A1"), order("A2")], 4)
			.await;
		let loaded = store
			.replace_or_append(OrderCollection::Open, 1, vec![order("B1"), order("B2")], 5)
			.await;

		let open = store.get_collection(OrderCollection::Open).await;
		assert_eq!(loaded, 4);
		assert_eq!(ids(&open), vec!["A1", "A2", "B1", "B2"]);
		assert_eq!(open.total, 5);
	}

	#[tokio::test]
	async fn test_first_page_twice_replaces() {
		let store = ListStore::new();
		store
			.replace_or_append(OrderCollection::Open, 0, vec![order("A1")], 1)
			.await;
		store
			.replace_or_append(OrderCollection::Open, 0, vec![order("B1")], 1)
			.await;

		assert_eq!(ids(&store.get_collection(OrderCollection::Open).await), vec!["B1"]);
	}

	#[tokio::test]
	async fn test_total_is_backend_count_not_list_length() {
		let store = ListStore::new();
		store
			.replace_or_append(OrderCollection::Packed, 0, vec![order("P1")], 120)
			.await;

		let packed = store.get_collection(OrderCollection::Packed).await;
		assert_eq!(packed.list.len(), 1);
		assert_eq!(packed.total, 120);
		assert!(store.get_collection(OrderCollection::Open).await.is_empty());
	}

	#[tokio::test]
	async fn test_merges_apply_in_gate_order() {
		let store = Arc::new(ListStore::new());
		store
			.replace_or_append(OrderCollection::Open, 0, vec![order("OLD")], 1)
			.await;

		// A page-1 fetch holds the gate while a page-0 reset queues behind it
		let page_one = store.begin_merge(OrderCollection::Open).await;

		let reset = {
			let store = store.clone();
			tokio::spawn(async move {
				store
					.replace_or_append(OrderCollection::Open, 0, vec![order("NEW")], 1)
					.await
			})
		};
		settle().await;
		assert!(!reset.is_finished());

		page_one
			.replace_or_append(1, vec![order("STALE")], 2)
			.await;
		reset.await.unwrap();

		assert_eq!(ids(&store.get_collection(OrderCollection::Open).await), vec!["NEW"]);
	}

	#[tokio::test]
	async fn test_abandoned_gate_leaves_state() {
		let store = ListStore::new();
		store
			.replace_or_append(OrderCollection::Open, 0, vec![order("A1")], 1)
			.await;

		store.begin_merge(OrderCollection::Open).await.abandon();

		assert_eq!(ids(&store.get_collection(OrderCollection::Open).await), vec!["A1"]);
	}

	#[tokio::test]
	async fn test_clear_keeps_current() {
		let store = ListStore::new();
		store
			.replace_or_append(OrderCollection::Open, 0, vec![order("A1")], 3)
			.await;
		store
			.replace_or_append(OrderCollection::Packed, 0, vec![order("P1")], 7)
			.await;
		store.set_current(order("A1")).await;

		store.clear().await;

		for collection in OrderCollection::all() {
			assert_eq!(store.get_collection(collection).await, PagedOrderList::default());
		}
		assert_eq!(store.current().await.map(|o| o.order_id), Some("A1".to_string()));
	}

	#[tokio::test]
	async fn test_lookups() {
		let store = ListStore::new();
		store
			.replace_or_append(OrderCollection::Open, 0, vec![order("A1"), order("A2")], 2)
			.await;
		store.set_current(order("C1")).await;

		assert!(store.find_in_open("A2").await.is_some());
		assert!(store.find_in_open("C1").await.is_none());
		assert!(store.current_if("C1").await.is_some());
		assert!(store.current_if("A1").await.is_none());
	}
}
