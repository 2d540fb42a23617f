use async_trait::async_trait;

use crate::error::NotificationResult;
use crate::models::{Email, Master, NewEmail, Pagination, RawTicket, Respond, User};

/// Identity (SSO) service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SsoRepository: Send + Sync {
    async fn get_user_by_id(&self, id: u64) -> NotificationResult<User>;

    async fn get_user_by_email(&self, email: &str) -> NotificationResult<User>;
}

/// Catalog (Toys) service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToysRepository: Send + Sync {
    async fn get_master_by_id(&self, id: u64) -> NotificationResult<Master>;
}

/// Request board (Tickets) service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketsRepository: Send + Sync {
    async fn get_ticket_by_id(&self, id: u64) -> NotificationResult<RawTicket>;

    /// Responds in the order the service returns them
    async fn get_ticket_responds(&self, ticket_id: u64) -> NotificationResult<Vec<Respond>>;
}

/// Append-only communication log
///
/// Records are never updated or deleted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailsRepository: Send + Sync {
    /// Insert one record and return its generated id
    async fn save_communication(&self, email: NewEmail) -> NotificationResult<u64>;

    /// Newest first; empty when nothing matches or the offset is past the end
    async fn get_user_communications(
        &self,
        user_id: u64,
        pagination: Option<Pagination>,
    ) -> NotificationResult<Vec<Email>>;

    async fn count_user_communications(&self, user_id: u64) -> NotificationResult<u64>;
}
