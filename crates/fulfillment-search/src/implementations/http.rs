//! HTTP search backend.
//!
//! Talks to the order management system's REST API:
//!
//! - `POST {base_url}/{open_orders_path}` with a `PageQuery` body returns
//!   `{ "count": n, "docs": [...] }` for open orders
//! - `POST {base_url}/{packed_orders_path}` returns the same shape for packed orders
//! - `POST {base_url}/{query_path}` with a structured query returns
//!   `{ "grouped": { "<field>": { "ngroups": n, "groups": [{ "groupValue": .., "doclist": { "docs": [...] } }] } } }`
//!
//! ## Configuration
//!
//! - `base_url` - API root, required
//! - `api_token` - bearer token, optional
//! - `timeout_seconds` - request timeout (default: 30)
//! - `open_orders_path`, `packed_orders_path`, `query_path` - endpoint overrides

use crate::{SearchError, SearchFactory, SearchInterface, SearchRegistry};
use async_trait::async_trait;
use fulfillment_types::{
	error_marker, http_url, ConfigSchema, Document, DocumentGroup, DocumentList, Field, FieldType,
	GroupedDocuments, ImplementationRegistry, PageQuery, Schema, SearchQuery, SecretString,
	ValidationError, ORDER_ID_FIELD,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Configuration of the HTTP search backend.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSearchConfig {
	pub base_url: String,
	#[serde(default)]
	pub api_token: Option<SecretString>,
	#[serde(default = "default_timeout_seconds")]
	pub timeout_seconds: u64,
	#[serde(default = "default_open_orders_path")]
	pub open_orders_path: String,
	#[serde(default = "default_packed_orders_path")]
	pub packed_orders_path: String,
	#[serde(default = "default_query_path")]
	pub query_path: String,
}

fn default_timeout_seconds() -> u64 {
	30
}

fn default_open_orders_path() -> String {
	"wms-orders".to_string()
}

fn default_packed_orders_path() -> String {
	"readytoshiporders".to_string()
}

fn default_query_path() -> String {
	"solr-query".to_string()
}

/// Search backend reached over HTTP.
pub struct HttpSearch {
	client: reqwest::Client,
	config: HttpSearchConfig,
}

impl HttpSearch {
	pub fn new(config: HttpSearchConfig) -> Result<Self, SearchError> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(config.timeout_seconds))
			.build()
			.map_err(|e| SearchError::Configuration(e.to_string()))?;

		Ok(Self { client, config })
	}

	fn url(&self, path: &str) -> String {
		format!(
			"{}/{}",
			self.config.base_url.trim_end_matches('/'),
			path.trim_start_matches('/')
		)
	}

	async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, SearchError> {
		let url = self.url(path);
		let mut request = self.client.post(&url).json(body);
		if let Some(token) = &self.config.api_token {
			request = request.bearer_auth(token.expose_secret());
		}

		let response = request
			.send()
			.await
			.map_err(|e| SearchError::Network(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			return Err(SearchError::Http {
				status: status.as_u16(),
				url,
			});
		}

		response
			.json::<Value>()
			.await
			.map_err(|e| SearchError::Parse(e.to_string()))
	}
}

/// Collects the object entries of a JSON array, skipping anything else.
fn documents(value: Option<&Value>) -> Vec<Document> {
	value
		.and_then(Value::as_array)
		.map(|docs| {
			docs.iter()
				.filter_map(|doc| doc.as_object().cloned())
				.collect()
		})
		.unwrap_or_default()
}

/// Interprets a listing response body.
pub fn parse_document_list(body: &Value) -> Result<DocumentList, SearchError> {
	if !body.is_object() {
		return Err(SearchError::Parse(format!(
			"Expected a JSON object, got {}",
			body
		)));
	}

	Ok(DocumentList {
		count: body.get("count").and_then(Value::as_u64).unwrap_or(0),
		docs: documents(body.get("docs")),
		error: error_marker(body),
	})
}

/// Interprets a grouped query response body for the given grouping field.
pub fn parse_grouped(body: &Value, field: &str) -> Result<GroupedDocuments, SearchError> {
	if !body.is_object() {
		return Err(SearchError::Parse(format!(
			"Expected a JSON object, got {}",
			body
		)));
	}

	let grouped = body.get("grouped").and_then(|grouped| grouped.get(field));
	let groups = grouped
		.and_then(|grouped| grouped.get("groups"))
		.and_then(Value::as_array)
		.map(|groups| {
			groups
				.iter()
				.map(|group| DocumentGroup {
					group_value: match group.get("groupValue") {
						Some(Value::String(s)) => Some(s.clone()),
						Some(Value::Number(n)) => Some(n.to_string()),
						_ => None,
					},
					docs: documents(group.get("doclist").and_then(|list| list.get("docs"))),
				})
				.collect()
		})
		.unwrap_or_default();

	Ok(GroupedDocuments {
		ngroups: grouped
			.and_then(|grouped| grouped.get("ngroups"))
			.and_then(Value::as_u64),
		groups,
		error: error_marker(body),
	})
}

#[async_trait]
impl SearchInterface for HttpSearch {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpSearchSchema)
	}

	async fn find_open_orders(&self, query: &PageQuery) -> Result<DocumentList, SearchError> {
		let body = self.post(&self.config.open_orders_path, query).await?;
		parse_document_list(&body)
	}

	async fn find_packed_orders(&self, query: &PageQuery) -> Result<DocumentList, SearchError> {
		let body = self.post(&self.config.packed_orders_path, query).await?;
		parse_document_list(&body)
	}

	async fn search_grouped(&self, query: &SearchQuery) -> Result<GroupedDocuments, SearchError> {
		let field = query.group_field().unwrap_or(ORDER_ID_FIELD).to_string();
		let body = self
			.post(&self.config.query_path, &query.to_request_body())
			.await?;
		parse_grouped(&body, &field)
	}
}

/// Configuration schema for HttpSearch.
pub struct HttpSearchSchema;

impl ConfigSchema for HttpSearchSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("base_url", FieldType::String).with_validator(http_url)],
			vec![
				Field::new("api_token", FieldType::String),
				Field::new(
					"timeout_seconds",
					FieldType::Integer {
						min: Some(1),
						max: Some(300),
					},
				),
				Field::new("open_orders_path", FieldType::String),
				Field::new("packed_orders_path", FieldType::String),
				Field::new("query_path", FieldType::String),
			],
		);
		schema.validate(config)
	}
}

/// Registry for the HTTP search implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = SearchFactory;

	fn factory() -> Self::Factory {
		create_search
	}
}

impl SearchRegistry for Registry {}

/// Factory function to create an HTTP search backend from configuration.
pub fn create_search(config: &toml::Value) -> Result<Box<dyn SearchInterface>, SearchError> {
	HttpSearchSchema
		.validate(config)
		.map_err(|e| SearchError::Configuration(e.to_string()))?;

	let http_config: HttpSearchConfig = config
		.clone()
		.try_into()
		.map_err(|e| SearchError::Configuration(format!("Invalid http search config: {}", e)))?;

	Ok(Box::new(HttpSearch::new(http_config)?))
}
