//! Notification Dispatcher
//!
//! Consumes account and ticket events from NATS and emails the people they
//! concern, logging every sent email to Postgres. The same log is readable
//! over gRPC.
//!
//! ## Architecture
//!
//! ```text
//! NATS subjects (verify-email, forget-password, update-ticket, delete-ticket)
//!   ↓ (one WorkerPool per subject, own connection each)
//! Bus handlers
//!   ↓
//! NotificationService ──▶ sso / toys / tickets (gRPC, lazy channels)
//!   ↓
//! SMTP (lettre) ──▶ emails table
//!
//! EmailsService (gRPC) ──▶ emails table
//! ```

mod config;
mod pools;

pub use config::DispatcherConfig;

use std::sync::Arc;

use core_config::{Environment, FromEnv};
use domain_notifications::{
    ContentBuilders, EmailsGrpcService, GrpcSsoRepository, GrpcTicketsRepository,
    GrpcToysRepository, NotificationService, PgEmailsRepository, SmtpEmailSender,
};
use eyre::{Result, WrapErr};
use grpc_client::server::{create_health_service, GrpcServer};
use messaging::{init_metrics, HealthServer};
use migration::Migrator;
use protos::notifications::emails_service_server::{EmailsServiceServer, SERVICE_NAME};
use tokio::signal;
use tonic::codec::CompressionEncoding;
use tonic::transport::Server;
use tracing::{error, info, warn};

use crate::pools::Pools;

/// Run the dispatcher until SIGINT/SIGTERM.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the database or the bus is
/// unreachable at startup, or the gRPC server fails.
pub async fn run() -> Result<()> {
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    let metrics_handle = init_metrics().wrap_err("Failed to install Prometheus recorder")?;

    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        environment = ?environment,
        "Starting notification dispatcher"
    );

    let config = DispatcherConfig::from_env().wrap_err("Failed to load configuration")?;

    // Health server first so probes answer while we connect
    let health_server = HealthServer::new(config.health_port).with_metrics(metrics_handle);
    let health = health_server.state();
    tokio::spawn(async move {
        if let Err(e) = health_server.run().await {
            error!(error = %e, "Health server failed");
        }
    });

    info!("Connecting to database...");
    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .wrap_err("Failed to connect to database")?;
    database::postgres::run_migrations::<Migrator>(&db, env!("CARGO_PKG_NAME"))
        .await
        .wrap_err("Failed to run migrations")?;
    database::postgres::check_health(&db)
        .await
        .wrap_err("Database is not answering queries")?;

    let sso = GrpcSsoRepository::connect_lazy(&config.clients.sso)
        .wrap_err("Failed to configure sso client")?;
    let toys = GrpcToysRepository::connect_lazy(&config.clients.toys)
        .wrap_err("Failed to configure toys client")?;
    let tickets = GrpcTicketsRepository::connect_lazy(&config.clients.tickets)
        .wrap_err("Failed to configure tickets client")?;

    let sender = SmtpEmailSender::new(&config.email.smtp).wrap_err("Failed to configure SMTP")?;
    match sender.check_connection().await {
        Ok(true) => info!(host = %config.email.smtp.host, "SMTP server reachable"),
        Ok(false) | Err(_) => {
            warn!(host = %config.email.smtp.host, "SMTP server not reachable yet, sends will be attempted anyway")
        }
    }

    let builders =
        ContentBuilders::from_links(&config.email.links).wrap_err("Invalid email link bases")?;

    let service = Arc::new(NotificationService::new(
        sso,
        toys,
        tickets,
        PgEmailsRepository::new(db),
        sender,
        builders,
    ));

    let pools = Pools::new(&config.nats, service.clone())?;
    info!(url = %config.nats.url, "Connecting worker pools to NATS...");
    pools.start(&config.nats.url, &health).await?;

    let addr = config
        .server
        .socket_addr()
        .wrap_err("Invalid gRPC server address")?;

    let (health_reporter, health_service) = create_health_service();
    GrpcServer::setup_health(&health_reporter, SERVICE_NAME).await;
    GrpcServer::log_startup(&addr, SERVICE_NAME);

    let served = Server::builder()
        .add_service(health_service)
        .add_service(
            EmailsServiceServer::from_arc(Arc::new(EmailsGrpcService::new(service)))
                .accept_compressed(CompressionEncoding::Zstd)
                .send_compressed(CompressionEncoding::Zstd),
        )
        .serve_with_shutdown(addr, shutdown_signal())
        .await;

    GrpcServer::mark_not_serving(&health_reporter, SERVICE_NAME).await;
    pools.stop(&health).await;

    served.wrap_err("gRPC server failed")?;

    info!("Notification dispatcher stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating shutdown..."),
    }
}
