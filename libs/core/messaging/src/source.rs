//! Message sources feeding a worker pool.

use crate::PoolError;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// A raw message taken off the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub subject: String,
    pub payload: Vec<u8>,
}

impl InboundMessage {
    pub fn new(subject: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            subject: subject.into(),
            payload: payload.into(),
        }
    }
}

/// Subscription the pool pulls messages from.
///
/// `next` must be cancel-safe: the pool races it against its shutdown signal.
#[async_trait]
pub trait MessageSource: Send + 'static {
    /// Wait for the next message. `None` means the subscription is closed.
    async fn next(&mut self) -> Option<InboundMessage>;

    /// Stop receiving messages from the bus.
    async fn unsubscribe(&mut self) -> Result<(), PoolError>;
}

/// In-process source backed by a tokio channel.
///
/// Used in tests and anywhere messages are produced inside the same process.
pub struct ChannelSource {
    subject: String,
    receiver: mpsc::Receiver<Vec<u8>>,
}

impl ChannelSource {
    /// Create a source and the sender that feeds it.
    pub fn new(subject: impl Into<String>, capacity: usize) -> (mpsc::Sender<Vec<u8>>, Self) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            sender,
            Self {
                subject: subject.into(),
                receiver,
            },
        )
    }
}

#[async_trait]
impl MessageSource for ChannelSource {
    async fn next(&mut self) -> Option<InboundMessage> {
        self.receiver
            .recv()
            .await
            .map(|payload| InboundMessage::new(self.subject.clone(), payload))
    }

    async fn unsubscribe(&mut self) -> Result<(), PoolError> {
        self.receiver.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_source_yields_messages_in_order() {
        let (tx, mut source) = ChannelSource::new("subject", 4);
        tx.send(b"one".to_vec()).await.unwrap();
        tx.send(b"two".to_vec()).await.unwrap();
        drop(tx);

        assert_eq!(source.next().await, Some(InboundMessage::new("subject", "one")));
        assert_eq!(source.next().await, Some(InboundMessage::new("subject", "two")));
        assert_eq!(source.next().await, None);
    }

    #[tokio::test]
    async fn test_channel_source_unsubscribe_rejects_new_messages() {
        let (tx, mut source) = ChannelSource::new("subject", 4);
        source.unsubscribe().await.unwrap();

        assert!(tx.send(b"late".to_vec()).await.is_err());
        assert_eq!(source.next().await, None);
    }
}
