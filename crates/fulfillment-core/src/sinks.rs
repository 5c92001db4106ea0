//! Collaborators the core reports to but does not own.
//!
//! Notices, progress signalling and product/stock hydration are presentation
//! or cache concerns of the embedding application. The core only sees the
//! traits below; the defaults log through `tracing` and do nothing else.

use async_trait::async_trait;
use fulfillment_types::Notice;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Receives user-facing notices.
pub trait NotificationSink: Send + Sync {
	fn notify(&self, notice: &Notice);
}

/// Start/stop signal around long-running operations.
pub trait ProgressSink: Send + Sync {
	fn start(&self);
	fn stop(&self);
}

/// Product details cache, hydrated by product id.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
	async fn fetch_products(&self, product_ids: Vec<String>);
}

/// Stock level cache, hydrated by product id.
#[async_trait]
pub trait StockCache: Send + Sync {
	async fn add_products(&self, product_ids: Vec<String>);
}

/// Writes notices to the log.
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
	fn notify(&self, notice: &Notice) {
		tracing::info!(
			key = notice.key(),
			params = ?notice.params(),
			suffix = notice.suffix().unwrap_or_default(),
			"Notice"
		);
	}
}

/// Progress sink that only traces.
pub struct LogProgress;

impl ProgressSink for LogProgress {
	fn start(&self) {
		tracing::trace!("Progress started");
	}

	fn stop(&self) {
		tracing::trace!("Progress stopped");
	}
}

/// Product and stock caches that discard every request.
pub struct DetachedCaches;

#[async_trait]
impl ProductCatalog for DetachedCaches {
	async fn fetch_products(&self, product_ids: Vec<String>) {
		tracing::debug!(count = product_ids.len(), "No product catalog attached");
	}
}

#[async_trait]
impl StockCache for DetachedCaches {
	async fn add_products(&self, product_ids: Vec<String>) {
		tracing::debug!(count = product_ids.len(), "No stock cache attached");
	}
}

/// The set of collaborators an engine reports to.
#[derive(Clone)]
pub struct Collaborators {
	pub notifier: Arc<dyn NotificationSink>,
	pub progress: Arc<dyn ProgressSink>,
	pub products: Arc<dyn ProductCatalog>,
	pub stock: Arc<dyn StockCache>,
}

impl Default for Collaborators {
	fn default() -> Self {
		let caches = Arc::new(DetachedCaches);
		Self {
			notifier: Arc::new(LogNotifier),
			progress: Arc::new(LogProgress),
			products: caches.clone(),
			stock: caches,
		}
	}
}

impl Collaborators {
	pub fn notify(&self, notice: Notice) {
		self.notifier.notify(&notice);
	}

	/// Hands product ids to the product cache and, if asked, the stock cache.
	///
	/// Both requests run detached on the current Tokio runtime; the caller
	/// never waits on them. Outside a runtime the requests are dropped.
	pub fn hydrate(&self, product_ids: Vec<String>, with_stock: bool) {
		if product_ids.is_empty() {
			return;
		}

		let Ok(runtime) = Handle::try_current() else {
			tracing::warn!(count = product_ids.len(), "No runtime to hydrate caches on");
			return;
		};

		if with_stock {
			let stock = self.stock.clone();
			let ids = product_ids.clone();
			runtime.spawn(async move { stock.add_products(ids).await });
		}

		let products = self.products.clone();
		runtime.spawn(async move { products.fetch_products(product_ids).await });
	}

	/// Starts progress if `start` is set. The returned guard stops it on drop;
	/// a guard that did not start the signal never stops it.
	pub fn progress(&self, start: bool) -> ProgressGuard {
		let sink = start.then(|| {
			self.progress.start();
			self.progress.clone()
		});
		ProgressGuard { sink }
	}
}

/// Stops a started progress signal when dropped, whatever path the
/// operation took.
pub struct ProgressGuard {
	sink: Option<Arc<dyn ProgressSink>>,
}

impl Drop for ProgressGuard {
	fn drop(&mut self) {
		if let Some(sink) = self.sink.take() {
			sink.stop();
		}
	}
}
