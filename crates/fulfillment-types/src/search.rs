//! Search backend query and response types.
//!
//! The search backend speaks two dialects. Page queries (`PageQuery`) are
//! sent to the open/packed listing endpoints and answer with a flat document
//! list. Structured queries (`SearchQuery`) are sent to the faceted query
//! endpoint and, when grouping is requested, answer with documents
//! partitioned by a key field.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// A raw document as returned by the search backend.
pub type Document = Map<String, Value>;

/// Field used to group order item documents into orders.
pub const ORDER_ID_FIELD: &str = "orderId";

/// Default upper bound on the number of documents returned per group.
pub const DEFAULT_GROUP_LIMIT: u32 = 1000;

/// Reads a scalar document field as a string.
///
/// Numbers and booleans are rendered with their JSON representation so that
/// backends that emit numeric identifiers still produce usable keys.
/// Missing, null and structured values yield `None`.
pub fn document_str(doc: &Document, key: &str) -> Option<String> {
	match doc.get(key)? {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}

/// Paginated listing request for the open and packed order endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
	/// Number of orders per page.
	pub view_size: u32,
	/// Page index. Zero starts a new listing session.
	pub view_index: u32,
	/// Facility the listing is scoped to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub facility_id: Option<String>,
	/// Free-text keyword filter.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub query_string: Option<String>,
	/// Sort directive understood by the backend.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub order_by: Option<String>,
	/// Field filters passed through verbatim.
	#[serde(default)]
	pub input_fields: BTreeMap<String, Value>,
}

impl PageQuery {
	/// Creates a query for the given page.
	pub fn new(view_size: u32, view_index: u32) -> Self {
		Self {
			view_size,
			view_index,
			..Default::default()
		}
	}

	/// Scopes the query to a facility.
	pub fn with_facility(mut self, facility_id: impl Into<String>) -> Self {
		self.facility_id = Some(facility_id.into());
		self
	}

	/// Sets or replaces a field filter.
	pub fn with_input_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.input_fields.insert(name.into(), value.into());
		self
	}

	/// Returns true when this query starts a new listing session.
	pub fn is_first_page(&self) -> bool {
		self.view_index == 0
	}
}

/// Structured query for the faceted search endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
	/// Main query expression.
	pub query: String,
	/// Filter queries, AND-joined by the backend.
	pub filters: Vec<String>,
	/// Engine parameters (rows, grouping directives, ...).
	pub params: BTreeMap<String, Value>,
}

impl SearchQuery {
	/// Creates a query matching every document.
	pub fn match_all() -> Self {
		Self {
			query: "*:*".to_string(),
			..Default::default()
		}
	}

	/// Adds a filter query.
	pub fn filter(mut self, filter: impl Into<String>) -> Self {
		self.filters.push(filter.into());
		self
	}

	/// Sets an engine parameter.
	pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.params.insert(name.into(), value.into());
		self
	}

	/// Limits the number of groups (or documents for flat queries) returned.
	pub fn rows(self, rows: usize) -> Self {
		self.param("rows", rows)
	}

	/// Requests results grouped by `field`, at most `limit` documents per group.
	pub fn grouped_by(self, field: &str, limit: u32) -> Self {
		self.param("group", true)
			.param("group.field", field)
			.param("group.ngroups", true)
			.param("group.limit", limit)
	}

	/// Builds the grouped lookup for a single order.
	pub fn order_detail(order_id: &str, group_limit: u32) -> Self {
		Self::match_all()
			.filter(format!("{}: {}", ORDER_ID_FIELD, quote_term(order_id)))
			.filter("docType: ORDER")
			.grouped_by(ORDER_ID_FIELD, group_limit)
	}

	/// Returns the grouping field if grouping was requested.
	pub fn group_field(&self) -> Option<&str> {
		self.params.get("group.field").and_then(Value::as_str)
	}

	/// Serializes the query into the JSON request body expected by the backend.
	pub fn to_request_body(&self) -> Value {
		json!({
			"json": {
				"params": self.params,
				"query": self.query,
				"filter": self.filters,
			}
		})
	}
}

/// Quotes a term for use inside a filter expression.
pub fn quote_term(term: &str) -> String {
	format!("\"{}\"", term.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Flat document list returned by listing endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentList {
	/// Number of matching documents on the backend.
	pub count: u64,
	/// Documents materialized in this response.
	pub docs: Vec<Document>,
	/// Error marker carried by the response body, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl DocumentList {
	/// True when the response matched nothing or carries an error marker.
	pub fn is_empty_or_failed(&self) -> bool {
		self.error.is_some() || self.count == 0
	}
}

/// One group of a grouped search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentGroup {
	/// Value of the grouping field shared by the group's documents.
	#[serde(default)]
	pub group_value: Option<String>,
	/// Ordered documents of the group.
	pub docs: Vec<Document>,
}

/// Grouped search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedDocuments {
	/// Number of groups matching on the backend, when requested.
	#[serde(default)]
	pub ngroups: Option<u64>,
	/// Groups in backend order.
	pub groups: Vec<DocumentGroup>,
	/// Error marker carried by the response body, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl GroupedDocuments {
	/// True when the response has no groups or carries an error marker.
	pub fn is_empty_or_failed(&self) -> bool {
		self.error.is_some() || self.groups.is_empty()
	}
}
