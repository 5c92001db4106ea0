//! Builder assembling a FulfillmentEngine from configuration.
//!
//! Each backend section of the configuration names its implementations and
//! the primary one. The builder instantiates every configured implementation
//! for which a factory is registered, so that configuration mistakes surface
//! at startup, and keeps the primary.

use crate::engine::{event_bus::EventBus, FulfillmentEngine};
use crate::sinks::Collaborators;
use fulfillment_config::{BackendConfig, Config};
use fulfillment_search::{SearchError, SearchInterface, SearchService};
use fulfillment_shipment::{ShipmentError, ShipmentInterface, ShipmentService};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Factory functions for every backend kind, keyed by implementation name.
pub struct EngineFactories<SF, HF> {
	pub search_factories: HashMap<String, SF>,
	pub shipment_factories: HashMap<String, HF>,
}

/// Builder for constructing a FulfillmentEngine with pluggable backends.
pub struct EngineBuilder {
	config: Config,
	collaborators: Collaborators,
	event_bus: EventBus,
}

impl EngineBuilder {
	/// Creates a builder with logging collaborators and a fresh event bus.
	pub fn new(config: Config) -> Self {
		Self {
			config,
			collaborators: Collaborators::default(),
			event_bus: EventBus::default(),
		}
	}

	pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
		self.collaborators = collaborators;
		self
	}

	pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
		self.event_bus = event_bus;
		self
	}

	/// Builds the engine using the given factories.
	pub fn build<SF, HF>(self, factories: EngineFactories<SF, HF>) -> Result<FulfillmentEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn SearchInterface>, SearchError>,
		HF: Fn(&toml::Value) -> Result<Box<dyn ShipmentInterface>, ShipmentError>,
	{
		let search = load_primary("search", &self.config.search, &factories.search_factories)?;
		let shipment = load_primary(
			"shipment",
			&self.config.shipment,
			&factories.shipment_factories,
		)?;

		Ok(FulfillmentEngine::new(
			self.config,
			Arc::new(SearchService::new(search)),
			Arc::new(ShipmentService::new(shipment)),
			self.collaborators,
			self.event_bus,
		))
	}
}

/// Instantiates every implementation of `section` that has a factory and
/// returns the primary one.
fn load_primary<T: ?Sized, E: Display, F>(
	component: &str,
	section: &BackendConfig,
	factories: &HashMap<String, F>,
) -> Result<Box<T>, BuilderError>
where
	F: Fn(&toml::Value) -> Result<Box<T>, E>,
{
	let mut implementations = HashMap::new();
	for (name, config) in &section.implementations {
		let Some(factory) = factories.get(name) else {
			tracing::warn!(component, implementation = %name, "No factory registered");
			continue;
		};

		match factory(config) {
			Ok(implementation) => {
				let is_primary = &section.primary == name;
				tracing::info!(component, implementation = %name, enabled = %is_primary, "Loaded");
				implementations.insert(name.clone(), implementation);
			},
			Err(e) => {
				tracing::error!(
					component,
					implementation = %name,
					error = %e,
					"Failed to create implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create {} implementation '{}': {}",
					component, name, e
				)));
			},
		}
	}

	if implementations.is_empty() {
		return Err(BuilderError::MissingComponent(format!(
			"No valid {} implementations available",
			component
		)));
	}

	implementations.remove(&section.primary).ok_or_else(|| {
		BuilderError::Config(format!(
			"Primary {} '{}' failed to load or has invalid configuration",
			component, section.primary
		))
	})
}
