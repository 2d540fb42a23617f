//! Prometheus metrics for worker pools.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Metrics for a single worker pool.
#[derive(Clone)]
pub struct PoolMetrics {
    subject: String,
    handler_name: String,
}

impl PoolMetrics {
    /// Create new metrics.
    pub fn new(subject: &str, handler_name: &str) -> Self {
        Self {
            subject: subject.to_string(),
            handler_name: handler_name.to_string(),
        }
    }

    /// Record a message taken off the bus.
    pub fn message_received(&self) {
        counter!(
            "worker_pool_messages_received_total",
            "subject" => self.subject.clone(),
            "handler" => self.handler_name.clone()
        )
        .increment(1);
    }

    /// Record a message whose handler returned.
    pub fn message_handled(&self, duration: Duration) {
        counter!(
            "worker_pool_messages_handled_total",
            "subject" => self.subject.clone(),
            "handler" => self.handler_name.clone()
        )
        .increment(1);

        histogram!(
            "worker_pool_handler_duration_seconds",
            "subject" => self.subject.clone(),
            "handler" => self.handler_name.clone()
        )
        .record(duration.as_secs_f64());
    }

    /// Record a handler that panicked.
    pub fn handler_panicked(&self) {
        counter!(
            "worker_pool_handler_panics_total",
            "subject" => self.subject.clone(),
            "handler" => self.handler_name.clone()
        )
        .increment(1);
    }

    /// Update the in-flight handlers gauge.
    pub fn in_flight(&self, count: usize) {
        gauge!(
            "worker_pool_in_flight",
            "subject" => self.subject.clone()
        )
        .set(count as f64);
    }
}

/// Initialize Prometheus metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}
