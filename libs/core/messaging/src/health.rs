//! Health endpoints for K8s probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Health status of the consumer process.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub bus_connected: bool,
    pub pools_running: bool,
    /// Consumers whose connection is currently down.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disconnected: Vec<String>,
}

/// Shared health state.
#[derive(Clone)]
pub struct HealthState {
    inner: Arc<RwLock<HealthStateInner>>,
}

struct HealthStateInner {
    /// Connection state per consumer; each pool has its own connection.
    connections: BTreeMap<String, bool>,
    pools_running: bool,
    last_error: Option<String>,
}

impl HealthStateInner {
    fn bus_connected(&self) -> bool {
        !self.connections.is_empty() && self.connections.values().all(|up| *up)
    }
}

impl HealthState {
    /// Create new health state. Nothing is ready until the pools report in.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HealthStateInner {
                connections: BTreeMap::new(),
                pools_running: false,
                last_error: None,
            })),
        }
    }

    /// Record the connection state of one consumer.
    ///
    /// The bus counts as connected only while every registered consumer is.
    pub async fn set_consumer_connected(&self, consumer: &str, connected: bool) {
        let mut inner = self.inner.write().await;
        inner.connections.insert(consumer.to_string(), connected);
    }

    pub async fn set_pools_running(&self, running: bool) {
        let mut inner = self.inner.write().await;
        inner.pools_running = running;
    }

    pub async fn set_error(&self, error: Option<String>) {
        let mut inner = self.inner.write().await;
        inner.last_error = error;
    }

    /// Check if alive (for liveness).
    ///
    /// A bus disconnection alone does not fail liveness; the client reconnects.
    pub async fn is_alive(&self) -> bool {
        let inner = self.inner.read().await;
        inner.pools_running
    }

    /// Check if ready (for readiness).
    pub async fn is_ready(&self) -> bool {
        let inner = self.inner.read().await;
        inner.bus_connected() && inner.pools_running
    }

    pub async fn status(&self) -> HealthStatus {
        let inner = self.inner.read().await;
        let bus_connected = inner.bus_connected();
        let status = if bus_connected && inner.pools_running {
            "healthy".to_string()
        } else {
            format!(
                "unhealthy: {}",
                inner.last_error.as_deref().unwrap_or("starting")
            )
        };

        HealthStatus {
            status,
            bus_connected,
            pools_running: inner.pools_running,
            disconnected: inner
                .connections
                .iter()
                .filter(|(_, up)| !**up)
                .map(|(consumer, _)| consumer.clone())
                .collect(),
        }
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Health server for K8s probes.
pub struct HealthServer {
    port: u16,
    state: HealthState,
    metrics_handle: Option<PrometheusHandle>,
}

impl HealthServer {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            state: HealthState::new(),
            metrics_handle: None,
        }
    }

    /// Set the metrics handle for /metrics endpoint.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    /// Get the health state for updates.
    pub fn state(&self) -> HealthState {
        self.state.clone()
    }

    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health_handler))
            .route("/healthz", get(health_handler))
            .route("/ready", get(ready_handler))
            .route("/readyz", get(ready_handler))
            .with_state(self.state.clone());

        if let Some(handle) = self.metrics_handle.clone() {
            router = router.route(
                "/metrics",
                get(move || {
                    let handle = handle.clone();
                    async move { handle.render() }
                }),
            );
        }

        router
    }

    /// Run the health server until the process exits.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let router = self.router();
        let addr = format!("0.0.0.0:{}", self.port);

        info!(addr = %addr, "Starting health server");

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}

async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let code = if state.is_alive().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(state.status().await))
}

async fn ready_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let code = if state.is_ready().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(state.status().await))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_starts_not_ready() {
        let state = HealthState::new();
        assert!(!state.is_alive().await);
        assert!(!state.is_ready().await);
        assert_eq!(state.status().await.status, "unhealthy: starting");
    }

    #[tokio::test]
    async fn test_ready_requires_bus_and_pools() {
        let state = HealthState::new();
        state.set_pools_running(true).await;
        assert!(state.is_alive().await);
        assert!(!state.is_ready().await);

        state.set_consumer_connected("verify-email-worker", true).await;
        assert!(state.is_ready().await);
        assert_eq!(state.status().await.status, "healthy");
    }

    #[tokio::test]
    async fn test_one_consumer_down_keeps_bus_disconnected() {
        let state = HealthState::new();
        state.set_pools_running(true).await;
        state.set_consumer_connected("verify-email-worker", true).await;
        state.set_consumer_connected("delete-ticket-worker", false).await;

        // Another consumer reconnecting must not mask the one still down
        state.set_consumer_connected("update-ticket-worker", true).await;
        assert!(!state.is_ready().await);

        let status = state.status().await;
        assert!(!status.bus_connected);
        assert_eq!(status.disconnected, vec!["delete-ticket-worker".to_string()]);

        state.set_consumer_connected("delete-ticket-worker", true).await;
        assert!(state.is_ready().await);
        assert!(state.status().await.disconnected.is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_reports_last_error() {
        let state = HealthState::new();
        state.set_pools_running(true).await;
        state.set_consumer_connected("verify-email-worker", false).await;
        state.set_error(Some("bus disconnected".to_string())).await;

        let status = state.status().await;
        assert_eq!(status.status, "unhealthy: bus disconnected");
        assert!(!status.bus_connected);
        assert!(state.is_alive().await);
    }
}
