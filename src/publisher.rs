//! Forwards domain events to NATS

use crate::domain::events::DomainEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self {
        Self { nats }
    }

    /// Log-only publisher.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub async fn connect(url: Option<&str>) -> Self {
        let Some(url) = url else { return Self::disabled() };
        match async_nats::connect(url).await {
            Ok(client) => {
                tracing::info!(%url, "connected to NATS");
                Self::new(Some(client))
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "NATS unavailable, events will only be logged");
                Self::disabled()
            }
        }
    }

    /// Publish failures are logged and swallowed; the write they describe already happened.
    pub async fn publish(&self, events: Vec<DomainEvent>) {
        for event in events {
            let subject = event.subject();
            let payload = match serde_json::to_vec(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!(subject, error = %e, "failed to encode event");
                    continue;
                }
            };
            tracing::info!(subject, event = %String::from_utf8_lossy(&payload), "domain event");
            if let Some(client) = &self.nats {
                if let Err(e) = client.publish(subject.to_string(), payload.into()).await {
                    tracing::error!(subject, error = %e, "failed to publish event");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::OrderEvent;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_event_payload_shape() {
        let id = Uuid::new_v4();
        let event = DomainEvent::Order(OrderEvent::Placed { order_id: id, total: dec!(36.00) });
        assert_eq!(event.subject(), "pricing.order.placed");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "placed");
        assert_eq!(json["order_id"], id.to_string());
        assert_eq!(json["total"], "36.00");
    }

    #[tokio::test]
    async fn test_disabled_publisher_accepts_events() {
        let event = DomainEvent::Order(OrderEvent::Placed { order_id: Uuid::new_v4(), total: dec!(1) });
        EventPublisher::disabled().publish(vec![event]).await;
    }
}
