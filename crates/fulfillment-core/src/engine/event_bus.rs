//! Broadcast bus for state change notifications.
//!
//! Any number of subscribers may listen; a subscriber that falls more than
//! the channel capacity behind observes `RecvError::Lagged` and continues
//! from the oldest retained event.

use fulfillment_types::FulfillmentEvent;
use tokio::sync::broadcast;

/// Default number of retained events per subscriber.
pub const DEFAULT_CAPACITY: usize = 256;

/// Event bus carrying `FulfillmentEvent`s to every subscriber.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<FulfillmentEvent>,
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity.max(1));
		Self { sender }
	}

	/// Subscribes to events published from now on.
	pub fn subscribe(&self) -> broadcast::Receiver<FulfillmentEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event, returning the number of receivers reached.
	///
	/// Fails only when nobody is subscribed.
	pub fn publish(
		&self,
		event: FulfillmentEvent,
	) -> Result<usize, broadcast::error::SendError<FulfillmentEvent>> {
		self.sender.send(event)
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}
