//! Registry trait for self-registering backend implementations.

/// Base trait for implementation registries.
///
/// Each backend crate (search, shipment) exposes one `Registry` struct per
/// implementation. The registry ties the name used under
/// `[<section>.implementations.<name>]` in the configuration to the factory
/// that builds the implementation from that table.
pub trait ImplementationRegistry {
	/// Name of the implementation in configuration files, e.g. `"http"`.
	const NAME: &'static str;

	/// Factory function type, defined by the backend crate.
	type Factory;

	/// Returns the factory for this implementation.
	fn factory() -> Self::Factory;
}
