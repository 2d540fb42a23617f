//! One worker pool per subscribed subject.

use std::sync::Arc;

use domain_notifications::config::{NatsConfig, SubjectConfig};
use domain_notifications::{
    ForgetPasswordHandler, NotificationUseCases, TicketDeletedHandler, TicketUpdatedHandler,
    VerifyEmailHandler,
};
use eyre::{Result, WrapErr};
use messaging::nats::NatsSource;
use messaging::{HealthState, MessageHandler, WorkerPool};
use tracing::{error, info};

pub struct Pools<N: NotificationUseCases + 'static> {
    verify_email: WorkerPool<VerifyEmailHandler<N>>,
    forget_password: WorkerPool<ForgetPasswordHandler<N>>,
    update_ticket: WorkerPool<TicketUpdatedHandler<N>>,
    delete_ticket: WorkerPool<TicketDeletedHandler<N>>,
}

impl<N: NotificationUseCases + 'static> Pools<N> {
    pub fn new(config: &NatsConfig, service: Arc<N>) -> Result<Self> {
        Ok(Self {
            verify_email: pool(
                config,
                &config.verify_email,
                VerifyEmailHandler::new(service.clone()),
            )?,
            forget_password: pool(
                config,
                &config.forget_password,
                ForgetPasswordHandler::new(service.clone()),
            )?,
            update_ticket: pool(
                config,
                &config.update_ticket,
                TicketUpdatedHandler::new(service.clone()),
            )?,
            delete_ticket: pool(
                config,
                &config.delete_ticket,
                TicketDeletedHandler::new(service),
            )?,
        })
    }

    /// Connect each pool to the bus and start consuming.
    ///
    /// Every pool gets its own connection, named after its worker.
    pub async fn start(&self, url: &str, health: &HealthState) -> Result<()> {
        start(&self.verify_email, url, health).await?;
        start(&self.forget_password, url, health).await?;
        start(&self.update_ticket, url, health).await?;
        start(&self.delete_ticket, url, health).await?;

        health.set_pools_running(true).await;
        info!("All worker pools started");
        Ok(())
    }

    /// Stop intake on every pool and wait for in-flight handlers.
    pub async fn stop(&self, health: &HealthState) {
        health.set_pools_running(false).await;

        for result in [
            self.verify_email.stop().await,
            self.forget_password.stop().await,
            self.update_ticket.stop().await,
            self.delete_ticket.stop().await,
        ] {
            if let Err(e) = result {
                error!(error = %e, "Failed to stop worker pool");
            }
        }

        info!("All worker pools stopped");
    }
}

fn pool<H: MessageHandler>(
    nats: &NatsConfig,
    subject: &SubjectConfig,
    handler: H,
) -> Result<WorkerPool<H>> {
    WorkerPool::new(nats.pool_config(subject), handler)
        .wrap_err_with(|| format!("Invalid worker pool configuration for {}", subject.subject))
}

async fn start<H: MessageHandler>(pool: &WorkerPool<H>, url: &str, health: &HealthState) -> Result<()> {
    let config = pool.config();
    let source = NatsSource::connect_with_health(url, config, health.clone())
        .await
        .wrap_err_with(|| format!("Failed to subscribe to {}", config.subject))?;

    pool.run(source)
        .await
        .wrap_err_with(|| format!("Failed to start worker pool for {}", config.subject))
}
