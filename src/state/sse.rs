use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::dto::sse::ServerEvent;

/// Fan-out of operator events to every open admin event stream.
///
/// Delivery is best effort: events published while nobody listens are dropped, and slow
/// subscribers skip what they lagged behind on.
pub struct EventHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventHub {
    /// Construct a hub whose subscribers buffer at most `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Amount of currently connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Serialize `payload` and send it under the `event` name.
    pub fn publish<T: Serialize>(&self, event: &'static str, payload: &T) {
        match ServerEvent::json(event, payload) {
            Ok(message) => {
                let delivered = self.sender.send(message).unwrap_or(0);
                debug!(event, delivered, "event published");
            }
            Err(err) => warn!(event, error = %err, "failed to serialize event payload"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_named_json_events() {
        let hub = EventHub::new(4);
        let mut rx = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);

        hub.publish("number.drawn", &serde_json::json!({ "number": 42 }));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("number.drawn"));
        assert_eq!(event.data, r#"{"number":42}"#);
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let hub = EventHub::new(4);
        hub.publish("game.created", &serde_json::json!({}));
        assert_eq!(hub.subscriber_count(), 0);
    }
}
