//! gRPC-backed collaborator repositories.
//!
//! Each call goes through `call_with_retry` with the collaborator's policy;
//! failures surface as `NotificationError::Upstream`.

use async_trait::async_trait;
use grpc_client::{ChannelConfig, RetryPolicy, call_with_retry, create_channel_lazy_with_config};
use protos::sso::users_service_client::UsersServiceClient;
use protos::sso::{GetUserByEmailIn, GetUserIn};
use protos::tickets::responds_service_client::RespondsServiceClient;
use protos::tickets::tickets_service_client::TicketsServiceClient;
use protos::tickets::{GetTicketIn, GetTicketRespondsIn};
use protos::toys::GetMasterIn;
use protos::toys::masters_service_client::MastersServiceClient;
use tonic::transport::Channel;
use tracing::instrument;

use crate::config::CollaboratorConfig;
use crate::error::{NotificationError, NotificationResult};
use crate::models::{Master, RawTicket, Respond, User};
use crate::repository::{SsoRepository, TicketsRepository, ToysRepository};

const SSO: &str = "sso";
const TOYS: &str = "toys";
const TICKETS: &str = "tickets";

fn lazy_channel(service: &'static str, config: &CollaboratorConfig) -> NotificationResult<Channel> {
    let channel_config = ChannelConfig::for_attempt_timeout(config.retry_timeout);
    create_channel_lazy_with_config(config.uri(), channel_config).map_err(|e| {
        NotificationError::InvalidConfig(format!("{} client address: {}", service, e))
    })
}

// ============================================================================
// SSO
// ============================================================================

#[derive(Clone)]
pub struct GrpcSsoRepository {
    client: UsersServiceClient<Channel>,
    retry: RetryPolicy,
}

impl GrpcSsoRepository {
    pub fn new(channel: Channel, retry: RetryPolicy) -> Self {
        Self {
            client: UsersServiceClient::new(channel),
            retry,
        }
    }

    /// Build on a lazy channel; the service may still be starting.
    pub fn connect_lazy(config: &CollaboratorConfig) -> NotificationResult<Self> {
        Ok(Self::new(lazy_channel(SSO, config)?, config.retry_policy()))
    }
}

#[async_trait]
impl SsoRepository for GrpcSsoRepository {
    #[instrument(skip(self), fields(user_id = id))]
    async fn get_user_by_id(&self, id: u64) -> NotificationResult<User> {
        let response = call_with_retry(self.retry, "GetUser", || {
            let mut client = self.client.clone();
            async move { client.get_user(GetUserIn { id }).await }
        })
        .await
        .map_err(|e| NotificationError::upstream(SSO, e))?;

        Ok(response.into_inner().into())
    }

    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> NotificationResult<User> {
        let response = call_with_retry(self.retry, "GetUserByEmail", || {
            let mut client = self.client.clone();
            let request = GetUserByEmailIn {
                email: email.to_string(),
            };
            async move { client.get_user_by_email(request).await }
        })
        .await
        .map_err(|e| NotificationError::upstream(SSO, e))?;

        Ok(response.into_inner().into())
    }
}

// ============================================================================
// Toys
// ============================================================================

#[derive(Clone)]
pub struct GrpcToysRepository {
    client: MastersServiceClient<Channel>,
    retry: RetryPolicy,
}

impl GrpcToysRepository {
    pub fn new(channel: Channel, retry: RetryPolicy) -> Self {
        Self {
            client: MastersServiceClient::new(channel),
            retry,
        }
    }

    pub fn connect_lazy(config: &CollaboratorConfig) -> NotificationResult<Self> {
        Ok(Self::new(lazy_channel(TOYS, config)?, config.retry_policy()))
    }
}

#[async_trait]
impl ToysRepository for GrpcToysRepository {
    #[instrument(skip(self), fields(master_id = id))]
    async fn get_master_by_id(&self, id: u64) -> NotificationResult<Master> {
        let response = call_with_retry(self.retry, "GetMaster", || {
            let mut client = self.client.clone();
            async move { client.get_master(GetMasterIn { id }).await }
        })
        .await
        .map_err(|e| NotificationError::upstream(TOYS, e))?;

        Ok(response.into_inner().into())
    }
}

// ============================================================================
// Tickets
// ============================================================================

/// Tickets and responds live in two services on the same endpoint.
#[derive(Clone)]
pub struct GrpcTicketsRepository {
    tickets: TicketsServiceClient<Channel>,
    responds: RespondsServiceClient<Channel>,
    retry: RetryPolicy,
}

impl GrpcTicketsRepository {
    pub fn new(channel: Channel, retry: RetryPolicy) -> Self {
        Self {
            tickets: TicketsServiceClient::new(channel.clone()),
            responds: RespondsServiceClient::new(channel),
            retry,
        }
    }

    pub fn connect_lazy(config: &CollaboratorConfig) -> NotificationResult<Self> {
        Ok(Self::new(lazy_channel(TICKETS, config)?, config.retry_policy()))
    }
}

#[async_trait]
impl TicketsRepository for GrpcTicketsRepository {
    #[instrument(skip(self), fields(ticket_id = id))]
    async fn get_ticket_by_id(&self, id: u64) -> NotificationResult<RawTicket> {
        let response = call_with_retry(self.retry, "GetTicket", || {
            let mut client = self.tickets.clone();
            async move { client.get_ticket(GetTicketIn { id }).await }
        })
        .await
        .map_err(|e| NotificationError::upstream(TICKETS, e))?;

        Ok(response.into_inner().into())
    }

    #[instrument(skip(self))]
    async fn get_ticket_responds(&self, ticket_id: u64) -> NotificationResult<Vec<Respond>> {
        let response = call_with_retry(self.retry, "GetTicketResponds", || {
            let mut client = self.responds.clone();
            async move {
                client
                    .get_ticket_responds(GetTicketRespondsIn { ticket_id })
                    .await
            }
        })
        .await
        .map_err(|e| NotificationError::upstream(TICKETS, e))?;

        Ok(response
            .into_inner()
            .responds
            .into_iter()
            .map(Into::into)
            .collect())
    }
}
