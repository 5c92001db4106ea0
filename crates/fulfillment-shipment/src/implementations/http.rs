//! HTTP status-change backend.
//!
//! Every operation is a JSON `POST` against the order management system.
//! Replies carry `_EVENT_MESSAGE_` on success and `_ERROR_MESSAGE_` or
//! `_ERROR_MESSAGE_LIST_` when the change was refused, usually with a 200
//! status either way.

use crate::{ShipmentError, ShipmentFactory, ShipmentInterface, ShipmentRegistry};
use async_trait::async_trait;
use fulfillment_types::{
	error_marker, http_url, ConfigSchema, Field, FieldType, ImplementationRegistry, QuickShipRequest,
	RejectItemRequest, Schema, SecretString, ShipmentUpdateRequest, StatusReply, ValidationError,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Configuration of the HTTP status-change backend.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpShipmentConfig {
	pub base_url: String,
	#[serde(default)]
	pub api_token: Option<SecretString>,
	#[serde(default = "default_timeout_seconds")]
	pub timeout_seconds: u64,
	#[serde(default = "default_reject_path")]
	pub reject_path: String,
	#[serde(default = "default_quick_ship_path")]
	pub quick_ship_path: String,
	#[serde(default = "default_update_shipment_path")]
	pub update_shipment_path: String,
}

fn default_timeout_seconds() -> u64 {
	30
}

fn default_reject_path() -> String {
	"rejectOrderItem".to_string()
}

fn default_quick_ship_path() -> String {
	"quickShipEntireShipGroup".to_string()
}

fn default_update_shipment_path() -> String {
	"updateShipment".to_string()
}

/// Status-change backend reached over HTTP.
pub struct HttpShipment {
	client: reqwest::Client,
	config: HttpShipmentConfig,
}

impl HttpShipment {
	pub fn new(config: HttpShipmentConfig) -> Result<Self, ShipmentError> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(config.timeout_seconds))
			.build()
			.map_err(|e| ShipmentError::Configuration(e.to_string()))?;

		Ok(Self { client, config })
	}

	async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<StatusReply, ShipmentError> {
		let url = format!(
			"{}/{}",
			self.config.base_url.trim_end_matches('/'),
			path.trim_start_matches('/')
		);
		let mut request = self.client.post(&url).json(body);
		if let Some(token) = &self.config.api_token {
			request = request.bearer_auth(token.expose_secret());
		}

		let response = request
			.send()
			.await
			.map_err(|e| ShipmentError::Network(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			return Err(ShipmentError::Http {
				status: status.as_u16(),
				url,
			});
		}

		let body = response
			.json::<Value>()
			.await
			.map_err(|e| ShipmentError::Parse(e.to_string()))?;
		Ok(parse_status_reply(&body))
	}
}

/// Interprets a status-change reply body.
///
/// A body carrying neither an error marker nor an event message is treated
/// as a success with no message.
pub fn parse_status_reply(body: &Value) -> StatusReply {
	StatusReply {
		event_message: body
			.get("_EVENT_MESSAGE_")
			.and_then(Value::as_str)
			.map(str::to_string),
		error: error_marker(body),
	}
}

#[async_trait]
impl ShipmentInterface for HttpShipment {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpShipmentSchema)
	}

	async fn reject_order_item(&self, request: &RejectItemRequest) -> Result<StatusReply, ShipmentError> {
		// The reject endpoint expects its parameters nested under "payload"
		self.post(&self.config.reject_path, &json!({ "payload": request }))
			.await
	}

	async fn quick_ship_entire_ship_group(
		&self,
		request: &QuickShipRequest,
	) -> Result<StatusReply, ShipmentError> {
		self.post(&self.config.quick_ship_path, request).await
	}

	async fn update_shipment(&self, request: &ShipmentUpdateRequest) -> Result<StatusReply, ShipmentError> {
		self.post(&self.config.update_shipment_path, request).await
	}
}

/// Configuration schema for HttpShipment.
pub struct HttpShipmentSchema;

impl ConfigSchema for HttpShipmentSchema {
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
				Field::new("reject_path", FieldType::String),
				Field::new("quick_ship_path", FieldType::String),
				Field::new("update_shipment_path", FieldType::String),
			],
		);
		schema.validate(config)
	}
}

/// Registry for the HTTP status-change implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = ShipmentFactory;

	fn factory() -> Self::Factory {
		create_shipment
	}
}

impl ShipmentRegistry for Registry {}

/// Factory function to create an HTTP status-change backend from configuration.
pub fn create_shipment(config: &toml::Value) -> Result<Box<dyn ShipmentInterface>, ShipmentError> {
	HttpShipmentSchema
		.validate(config)
		.map_err(|e| ShipmentError::Configuration(e.to_string()))?;

	let http_config: HttpShipmentConfig = config.clone().try_into().map_err(|e| {
		ShipmentError::Configuration(format!("Invalid http shipment config: {}", e))
	})?;

	Ok(Box::new(HttpShipment::new(http_config)?))
}
