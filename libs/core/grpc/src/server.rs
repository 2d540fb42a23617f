//! gRPC server helpers.
//!
//! ```ignore
//! use grpc_client::server::{GrpcServer, create_health_service};
//! use protos::notifications::emails_service_server::{EmailsServiceServer, SERVICE_NAME};
//!
//! let (health_reporter, health_service) = create_health_service();
//! GrpcServer::setup_health(&health_reporter, SERVICE_NAME).await;
//! GrpcServer::log_startup(&addr, SERVICE_NAME);
//!
//! Server::builder()
//!     .add_service(health_service)
//!     .add_service(EmailsServiceServer::new(service))
//!     .serve(addr)
//!     .await?;
//! ```

use std::net::SocketAddr;
use tonic_health::ServingStatus;
use tonic_health::server::HealthReporter;
use tracing::info;

pub use tonic_health::server::health_reporter as create_health_service;

pub struct GrpcServer;

impl GrpcServer {
  pub fn log_startup(addr: &SocketAddr, service_name: &str) {
    info!(
      addr = %addr,
      service = service_name,
      "gRPC server starting (zstd compression, grpc.health.v1.Health enabled)"
    );
  }

  /// Mark the service and the empty service name as serving.
  ///
  /// The empty name is what k8s gRPC probes ask for by default.
  pub async fn setup_health(health_reporter: &HealthReporter, service_name: &str) {
    Self::set_status(health_reporter, service_name, ServingStatus::Serving).await;
    info!(service = service_name, "Service marked as serving");
  }

  /// Mark the service as not serving before shutdown so probes drain traffic.
  pub async fn mark_not_serving(health_reporter: &HealthReporter, service_name: &str) {
    Self::set_status(health_reporter, service_name, ServingStatus::NotServing).await;
    info!(service = service_name, "Service marked as not serving");
  }

  async fn set_status(health_reporter: &HealthReporter, service_name: &str, status: ServingStatus) {
    health_reporter
      .set_service_status(service_name, status)
      .await;
    health_reporter.set_service_status("", status).await;
  }
}
