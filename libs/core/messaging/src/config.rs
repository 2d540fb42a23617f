//! Configuration for worker pools.

/// Worker pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Subject the pool subscribes to
    pub subject: String,

    /// Maximum number of handlers running at the same time
    pub concurrency: usize,

    /// Number of received messages buffered while all workers are busy
    pub queue_capacity: usize,

    /// Name the pool announces itself with on the bus
    pub consumer_name: String,
}

impl PoolConfig {
    /// Create a configuration with one worker and a single-slot queue.
    pub fn new(subject: impl Into<String>) -> Self {
        let subject = subject.into();
        let consumer_name = format!("{}-worker", subject);

        Self {
            subject,
            concurrency: 1,
            queue_capacity: 1,
            consumer_name,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_consumer_name(mut self, consumer_name: impl Into<String>) -> Self {
        self.consumer_name = consumer_name.into();
        self
    }

    /// Check that the pool can actually make progress with this configuration.
    pub fn validate(&self) -> Result<(), crate::PoolError> {
        if self.subject.trim().is_empty() {
            return Err(crate::PoolError::InvalidConfig(
                "subject must not be empty".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(crate::PoolError::InvalidConfig(format!(
                "concurrency for '{}' must be at least 1",
                self.subject
            )));
        }
        if self.queue_capacity == 0 {
            return Err(crate::PoolError::InvalidConfig(format!(
                "queue capacity for '{}' must be at least 1",
                self.subject
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PoolError;

    #[test]
    fn test_defaults() {
        let config = PoolConfig::new("users.verify-email");
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.queue_capacity, 1);
        assert_eq!(config.consumer_name, "users.verify-email-worker");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = PoolConfig::new("tickets.deleted")
            .with_concurrency(8)
            .with_queue_capacity(64)
            .with_consumer_name("ticket-deleted-worker");

        assert_eq!(config.concurrency, 8);
        assert_eq!(config.queue_capacity, 64);
        assert_eq!(config.consumer_name, "ticket-deleted-worker");
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let err = PoolConfig::new("a").with_concurrency(0).validate().unwrap_err();
        assert!(matches!(err, PoolError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_rejects_zero_queue() {
        let err = PoolConfig::new("a").with_queue_capacity(0).validate().unwrap_err();
        assert!(matches!(err, PoolError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_rejects_blank_subject() {
        assert!(PoolConfig::new("  ").validate().is_err());
    }
}
