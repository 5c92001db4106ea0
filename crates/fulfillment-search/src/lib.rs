//! Search backend collaborator for the fulfillment client.
//!
//! The search backend answers listing queries for open and packed orders
//! with flat document lists, and structured queries with documents grouped
//! by a key field. This crate defines the interface the core consumes and
//! the HTTP implementation used against the order management system.

use async_trait::async_trait;
use fulfillment_types::{
	ConfigSchema, DocumentList, GroupedDocuments, ImplementationRegistry, PageQuery, SearchQuery,
};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
}

/// Errors that can occur while talking to the search backend.
#[derive(Debug, Error)]
pub enum SearchError {
	/// The request never produced a response.
	#[error("Network error: {0}")]
	Network(String),
	/// The backend answered with a non-success HTTP status.
	#[error("HTTP {status} from {url}")]
	Http { status: u16, url: String },
	/// The response body could not be interpreted.
	#[error("Parse error: {0}")]
	Parse(String),
	/// The implementation configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for search backend implementations.
///
/// Error markers carried inside an otherwise successful response are
/// returned as data (`error` fields), not as `Err`; `Err` is reserved for
/// transport-level failures.
#[async_trait]
pub trait SearchInterface: Send + Sync {
	/// Returns the configuration schema for this implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Lists candidate open orders, one lightweight document per order.
	async fn find_open_orders(&self, query: &PageQuery) -> Result<DocumentList, SearchError>;

	/// Lists packed orders, one document per order.
	async fn find_packed_orders(&self, query: &PageQuery) -> Result<DocumentList, SearchError>;

	/// Runs a structured query whose results are grouped by
	/// `query.group_field()`.
	async fn search_grouped(&self, query: &SearchQuery) -> Result<GroupedDocuments, SearchError>;
}

/// Type alias for search factory functions.
pub type SearchFactory = fn(&toml::Value) -> Result<Box<dyn SearchInterface>, SearchError>;

/// Registry trait for search implementations.
pub trait SearchRegistry: ImplementationRegistry<Factory = SearchFactory> {}

/// Get all registered search implementations.
///
/// Returns a vector of (name, factory) tuples used by the builder to
/// instantiate the configured implementations.
pub fn get_all_implementations() -> Vec<(&'static str, SearchFactory)> {
	use implementations::http;

	vec![(http::Registry::NAME, http::Registry::factory())]
}

/// Service wrapping the configured search implementation.
///
/// The core only ever talks to this service; which backend answers is
/// decided once at build time from `[search].primary`.
pub struct SearchService {
	backend: Box<dyn SearchInterface>,
}

impl SearchService {
	/// Creates a new SearchService with the specified backend.
	pub fn new(backend: Box<dyn SearchInterface>) -> Self {
		Self { backend }
	}

	/// Lists candidate open orders.
	pub async fn find_open_orders(&self, query: &PageQuery) -> Result<DocumentList, SearchError> {
		tracing::debug!(
			view_index = query.view_index,
			view_size = query.view_size,
			"Querying open orders"
		);
		self.backend.find_open_orders(query).await
	}

	/// Lists packed orders.
	pub async fn find_packed_orders(&self, query: &PageQuery) -> Result<DocumentList, SearchError> {
		tracing::debug!(
			view_index = query.view_index,
			view_size = query.view_size,
			"Querying packed orders"
		);
		self.backend.find_packed_orders(query).await
	}

	/// Runs a grouped structured query.
	pub async fn search_grouped(&self, query: &SearchQuery) -> Result<GroupedDocuments, SearchError> {
		tracing::debug!(filters = query.filters.len(), "Running grouped query");
		self.backend.search_grouped(query).await
	}
}
