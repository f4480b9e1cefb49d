//! Fire-and-forget publication of cart events over NATS.

use tracing::{debug, warn};

use crate::domain::events::CartEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn disabled() -> Self { Self::default() }

    pub async fn connect(url: &str) -> Result<Self, async_nats::ConnectError> {
        let client = async_nats::connect(url).await?;
        Ok(Self { nats: Some(client) })
    }

    pub fn is_enabled(&self) -> bool { self.nats.is_some() }

    /// Never fails the caller; publish errors are logged and dropped.
    pub async fn publish(&self, event: CartEvent) {
        let Some(client) = &self.nats else {
            debug!(subject = event.subject(), "event publishing disabled");
            return;
        };
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(subject = event.subject(), error = %e, "failed to encode cart event");
                return;
            }
        };
        if let Err(e) = client.publish(event.subject().to_string(), payload.into()).await {
            warn!(subject = event.subject(), user_id = event.user_id(), error = %e, "failed to publish cart event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_publisher_swallows_events() {
        let publisher = EventPublisher::disabled();
        assert!(!publisher.is_enabled());
        publisher.publish(CartEvent::CartCleared { user_id: "u1".into() }).await;
    }
}
