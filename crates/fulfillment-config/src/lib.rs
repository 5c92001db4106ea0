//! Configuration for the fulfillment client.
//!
//! Configuration is loaded from TOML. Values may reference environment
//! variables as `${VAR}` or `${VAR:-default}`, and a file may pull sections
//! from other files with `include = ["backends.toml"]`; each top-level
//! section must then be defined in exactly one file.

mod loader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity and preferences of this client.
	pub client: ClientConfig,
	/// Pagination and grouping defaults.
	#[serde(default)]
	pub fetch: FetchConfig,
	/// Search backend implementations.
	pub search: BackendConfig,
	/// Status-change backend implementations.
	pub shipment: BackendConfig,
}

/// Identity and user preferences of the client instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
	/// Identifier used in logs.
	pub id: String,
	/// Whether carrier-shipped orders are handled.
	/// When false every open-order query is restricted to store pickup.
	#[serde(default = "default_shipping_orders")]
	pub shipping_orders: bool,
	/// Facility used when a command does not name one.
	#[serde(default)]
	pub facility_id: Option<String>,
}

fn default_shipping_orders() -> bool {
	true
}

/// Pagination and grouping defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
	/// Orders per page.
	#[serde(default = "default_view_size")]
	pub view_size: u32,
	/// Upper bound on documents returned per order group.
	#[serde(default = "default_group_limit")]
	pub group_limit: u32,
}

impl Default for FetchConfig {
	fn default() -> Self {
		Self {
			view_size: default_view_size(),
			group_limit: default_group_limit(),
		}
	}
}

fn default_view_size() -> u32 {
	10
}

fn default_group_limit() -> u32 {
	1000
}

/// Pluggable backend section: named implementations plus the one in use.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
	/// Which implementation to use.
	pub primary: String,
	/// Map of implementation names to their raw configuration tables.
	pub implementations: HashMap<String, toml::Value>,
}

impl BackendConfig {
	/// Returns the table of the primary implementation.
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}

	fn validate(&self, section: &str) -> Result<(), ConfigError> {
		if self.implementations.is_empty() {
			return Err(ConfigError::Validation(format!(
				"At least one {} implementation must be configured",
				section
			)));
		}
		if self.primary.is_empty() {
			return Err(ConfigError::Validation(format!(
				"{} primary implementation cannot be empty",
				section
			)));
		}
		if !self.implementations.contains_key(&self.primary) {
			return Err(ConfigError::Validation(format!(
				"Primary {} '{}' not found in implementations",
				section, self.primary
			)));
		}
		Ok(())
	}
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of `VAR_NAME` and
/// `${VAR_NAME:-default}` with the value or the default.
/// Inputs are capped at 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut replacements = Vec::new();
	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match (std::env::var(var_name.as_str()), cap.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				return Err(ConfigError::Validation(format!(
					"Environment variable '{}' not found",
					var_name.as_str()
				)));
			},
		};
		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply in reverse so earlier offsets stay valid
	let mut result = input.to_string();
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following include directives.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		let config = loader.load_config(file_name).await?;

		tracing::debug!(client_id = %config.client.id, "Loaded configuration");
		Ok(config)
	}

	/// Validates cross-field constraints that serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.client.id.is_empty() {
			return Err(ConfigError::Validation("Client ID cannot be empty".into()));
		}

		if self.fetch.view_size == 0 || self.fetch.view_size > 250 {
			return Err(ConfigError::Validation(
				"fetch.view_size must be between 1 and 250".into(),
			));
		}
		if self.fetch.group_limit == 0 || self.fetch.group_limit > 10_000 {
			return Err(ConfigError::Validation(
				"fetch.group_limit must be between 1 and 10000".into(),
			));
		}

		self.search.validate("search")?;
		self.shipment.validate("shipment")?;

		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
