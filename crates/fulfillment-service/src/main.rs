//! Command-line client for store fulfillment.
//!
//! Each subcommand runs one engine operation against the configured search
//! and status-change backends and prints its result as JSON.

use clap::{Parser, Subcommand};
use fulfillment_config::Config;
use fulfillment_core::{EngineBuilder, EngineFactories, FulfillmentEngine, QueryContext};
use fulfillment_search::SearchFactory;
use fulfillment_shipment::ShipmentFactory;
use fulfillment_types::{RejectItem, STORE_PICKUP};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Command-line arguments for the fulfillment client.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Fetch a page of open pickup orders
	Open {
		#[arg(long, default_value_t = 0)]
		page: u32,
		/// Facility overriding the configured one
		#[arg(long)]
		facility: Option<String>,
		/// Restrict the listing to store pickup regardless of configuration
		#[arg(long)]
		pickup_only: bool,
	},
	/// Fetch a page of packed shipments awaiting pickup
	Packed {
		#[arg(long, default_value_t = 0)]
		page: u32,
		#[arg(long)]
		facility: Option<String>,
	},
	/// Resolve one order, restricted to a shipment method
	Detail {
		#[arg(long)]
		order_id: String,
		#[arg(long, default_value = STORE_PICKUP)]
		shipment_method: String,
	},
	/// Reject items of an order
	Reject {
		#[arg(long)]
		order_id: String,
		/// JSON array of items to reject
		#[arg(long)]
		items: String,
	},
	/// Ship an entire ship group and pack the resulting shipment
	QuickShip {
		#[arg(long)]
		order_id: String,
		#[arg(long)]
		ship_group: String,
		#[arg(long, default_value = STORE_PICKUP)]
		shipment_method: String,
		#[arg(long)]
		facility: Option<String>,
	},
	/// Mark a shipment packed
	Pack {
		#[arg(long)]
		shipment_id: String,
	},
	/// Mark a shipment handed over to its customer
	Deliver {
		#[arg(long)]
		shipment_id: String,
		#[arg(long)]
		customer_name: String,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();

	let path = args
		.config
		.to_str()
		.ok_or("Configuration path is not valid UTF-8")?;
	let config = Config::from_file(path).await?;
	tracing::info!("Loaded configuration [{}]", config.client.id);

	let mut engine = build_engine(config)?;
	let mut events = engine.event_bus().subscribe();

	let output = run(&mut engine, args.command).await?;
	println!("{}", output);

	while let Ok(event) = events.try_recv() {
		tracing::debug!(event = ?event, "Event");
	}
	Ok(())
}

/// Builds the engine with every registered backend implementation.
fn build_engine(config: Config) -> Result<FulfillmentEngine, Box<dyn std::error::Error>> {
	let search_factories: HashMap<String, SearchFactory> = fulfillment_search::get_all_implementations()
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect();
	let shipment_factories: HashMap<String, ShipmentFactory> =
		fulfillment_shipment::get_all_implementations()
			.into_iter()
			.map(|(name, factory)| (name.to_string(), factory))
			.collect();

	let engine = EngineBuilder::new(config).build(EngineFactories {
		search_factories,
		shipment_factories,
	})?;
	Ok(engine)
}

/// Runs one command and renders its result.
async fn run(
	engine: &mut FulfillmentEngine,
	command: Command,
) -> Result<String, Box<dyn std::error::Error>> {
	match command {
		Command::Open {
			page,
			facility,
			pickup_only,
		} => {
			if pickup_only {
				engine.set_context(QueryContext::new(false));
			}
			let mut query = engine.page(page);
			if facility.is_some() {
				query.facility_id = facility;
			}
			render(&engine.fetch_open_page(query).await?)
		},
		Command::Packed { page, facility } => {
			let mut query = engine.page(page);
			if facility.is_some() {
				query.facility_id = facility;
			}
			render(&engine.fetch_packed_page(query).await?)
		},
		Command::Detail {
			order_id,
			shipment_method,
		} => render(
			&engine
				.resolve_detail(&order_id, &shipment_method, None)
				.await?,
		),
		Command::Reject { order_id, items } => {
			let items: Vec<RejectItem> = serde_json::from_str(&items)?;
			render(&engine.reject_items(&order_id, &items).await)
		},
		Command::QuickShip {
			order_id,
			ship_group,
			shipment_method,
			facility,
		} => {
			let resolved = engine
				.resolve_detail(&order_id, &shipment_method, None)
				.await?;
			render(
				&engine
					.quick_ship_group(&resolved.order, &ship_group, facility)
					.await?,
			)
		},
		Command::Pack { shipment_id } => render(&engine.pack_items(&shipment_id).await?),
		Command::Deliver {
			shipment_id,
			customer_name,
		} => render(
			&engine
				.deliver_shipment(&shipment_id, &customer_name)
				.await?,
		),
	}
}

fn render<T: Serialize>(value: &T) -> Result<String, Box<dyn std::error::Error>> {
	Ok(serde_json::to_string_pretty(value)?)
}
