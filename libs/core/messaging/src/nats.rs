//! NATS core subscriptions as a [`MessageSource`].

use crate::{HealthState, InboundMessage, MessageSource, PoolConfig, PoolError};
use async_nats::{Client, Event, Subscriber};
use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, info, warn};

/// Subscription to one subject over its own named NATS connection.
pub struct NatsSource {
    client: Client,
    subscriber: Subscriber,
    subject: String,
}

impl NatsSource {
    /// Open a connection named after the pool's consumer and subscribe to its subject.
    pub async fn connect(url: &str, config: &PoolConfig) -> Result<Self, PoolError> {
        let client = async_nats::ConnectOptions::new()
            .name(&config.consumer_name)
            .connect(url)
            .await
            .map_err(|e| {
                PoolError::Subscription(format!("Failed to connect to NATS at {}: {}", url, e))
            })?;

        Self::subscribe(client, config).await
    }

    /// Like [`NatsSource::connect`], but mirrors connection events into `health`.
    pub async fn connect_with_health(
        url: &str,
        config: &PoolConfig,
        health: HealthState,
    ) -> Result<Self, PoolError> {
        let consumer = config.consumer_name.clone();
        let events_health = health.clone();
        let client = async_nats::ConnectOptions::new()
            .name(&config.consumer_name)
            .event_callback(move |event| {
                let health = events_health.clone();
                let consumer = consumer.clone();
                async move {
                    match event {
                        Event::Connected => {
                            info!(consumer = %consumer, "NATS connection established");
                            health.set_consumer_connected(&consumer, true).await;
                            health.set_error(None).await;
                        }
                        Event::Disconnected => {
                            warn!(consumer = %consumer, "NATS connection lost");
                            health.set_consumer_connected(&consumer, false).await;
                            health
                                .set_error(Some(format!("{} disconnected from NATS", consumer)))
                                .await;
                        }
                        other => debug!(consumer = %consumer, event = ?other, "NATS event"),
                    }
                }
            })
            .connect(url)
            .await
            .map_err(|e| {
                PoolError::Subscription(format!("Failed to connect to NATS at {}: {}", url, e))
            })?;

        health
            .set_consumer_connected(&config.consumer_name, true)
            .await;

        Self::subscribe(client, config).await
    }

    /// Subscribe on an existing client.
    pub async fn subscribe(client: Client, config: &PoolConfig) -> Result<Self, PoolError> {
        let subscriber = client
            .subscribe(config.subject.clone())
            .await
            .map_err(|e| {
                PoolError::Subscription(format!(
                    "Failed to subscribe to {}: {}",
                    config.subject, e
                ))
            })?;

        info!(subject = %config.subject, consumer = %config.consumer_name, "Subscribed");

        Ok(Self {
            client,
            subscriber,
            subject: config.subject.clone(),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl MessageSource for NatsSource {
    async fn next(&mut self) -> Option<InboundMessage> {
        self.subscriber.next().await.map(|msg| InboundMessage {
            subject: msg.subject.to_string(),
            payload: msg.payload.to_vec(),
        })
    }

    async fn unsubscribe(&mut self) -> Result<(), PoolError> {
        self.subscriber
            .unsubscribe()
            .await
            .map_err(|e| {
                PoolError::Subscription(format!(
                    "Failed to unsubscribe from {}: {}",
                    self.subject, e
                ))
            })?;
        self.client
            .flush()
            .await
            .map_err(|e| PoolError::Subscription(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use test_utils::TestNats;

    #[tokio::test]
    #[ignore] // Requires Docker
    async fn test_source_receives_published_messages() {
        let nats = TestNats::new().await;
        let config = PoolConfig::new("verify-email");

        let mut source = NatsSource::connect(&nats.connection_string, &config)
            .await
            .unwrap();

        let publisher = nats.client();
        publisher
            .publish("verify-email", r#"{"user_id":1}"#.into())
            .await
            .unwrap();
        publisher.flush().await.unwrap();

        let message = tokio::time::timeout(Duration::from_secs(5), source.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(message.subject, "verify-email");
        assert_eq!(message.payload, br#"{"user_id":1}"#.to_vec());

        source.unsubscribe().await.unwrap();
    }
}
