use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::error::NotificationResult;
use crate::events::TicketDeleted;
use crate::models::{
    DeliveryOutcome, Email, Master, NewEmail, Pagination, RawTicket, RecipientOutcome, User,
};
use crate::providers::EmailSender;
use crate::repository::{EmailsRepository, SsoRepository, TicketsRepository, ToysRepository};
use crate::templates::ContentBuilders;

/// What the bus handlers and the read API need from the orchestrator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationUseCases: Send + Sync {
    async fn send_verification_email(&self, user_id: u64) -> NotificationResult<u64>;

    async fn send_password_reset_email(
        &self,
        user_id: u64,
        new_password: &str,
    ) -> NotificationResult<u64>;

    async fn send_listing_updated_notification(&self, ticket_id: u64)
    -> NotificationResult<Vec<u64>>;

    async fn send_listing_withdrawn_notification(
        &self,
        event: TicketDeleted,
    ) -> NotificationResult<Vec<u64>>;

    async fn get_user_email_communications(
        &self,
        user_id: u64,
        pagination: Option<Pagination>,
    ) -> NotificationResult<Vec<Email>>;

    async fn count_user_email_communications(&self, user_id: u64) -> NotificationResult<u64>;
}

/// Resolves recipients, renders, sends and logs.
///
/// Every successful send is logged exactly once, right after the send, with
/// the same body that went out. A failed send is never logged. Fan-outs walk
/// recipients strictly in upstream order.
pub struct NotificationService<S, T, K, E, M> {
    sso: Arc<S>,
    toys: Arc<T>,
    tickets: Arc<K>,
    emails: Arc<E>,
    sender: Arc<M>,
    builders: ContentBuilders,
}

impl<S, T, K, E, M> Clone for NotificationService<S, T, K, E, M> {
    fn clone(&self) -> Self {
        Self {
            sso: Arc::clone(&self.sso),
            toys: Arc::clone(&self.toys),
            tickets: Arc::clone(&self.tickets),
            emails: Arc::clone(&self.emails),
            sender: Arc::clone(&self.sender),
            builders: self.builders.clone(),
        }
    }
}

impl<S, T, K, E, M> NotificationService<S, T, K, E, M>
where
    S: SsoRepository,
    T: ToysRepository,
    K: TicketsRepository,
    E: EmailsRepository,
    M: EmailSender,
{
    pub fn new(sso: S, toys: T, tickets: K, emails: E, sender: M, builders: ContentBuilders) -> Self {
        Self {
            sso: Arc::new(sso),
            toys: Arc::new(toys),
            tickets: Arc::new(tickets),
            emails: Arc::new(emails),
            sender: Arc::new(sender),
            builders,
        }
    }

    /// Send to one user, then log what was sent.
    async fn send_and_log(&self, recipient: &User, subject: &str, body: String) -> NotificationResult<u64> {
        self.sender
            .send(subject, &body, std::slice::from_ref(&recipient.email))
            .await?;

        self.emails
            .save_communication(NewEmail::sent_now(recipient, body))
            .await
    }

    /// The user behind a master.
    async fn master_owner(&self, master_id: u64) -> NotificationResult<User> {
        let master: Master = self.toys.get_master_by_id(master_id).await?;
        self.sso.get_user_by_id(master.user_id).await
    }

    async fn notify_ticket_updated(&self, ticket: &RawTicket, owner: &User) -> NotificationResult<u64> {
        let builder = &self.builders.ticket_updated;
        self.send_and_log(owner, &builder.subject(ticket), builder.body(ticket, owner))
            .await
    }

    async fn notify_ticket_deleted(
        &self,
        event: &TicketDeleted,
        ticket_owner: &User,
        respond_owner: &User,
    ) -> NotificationResult<u64> {
        let builder = &self.builders.ticket_deleted;
        self.send_and_log(
            respond_owner,
            &builder.subject(event),
            builder.body(event, ticket_owner, respond_owner),
        )
        .await
    }

    /// Resolve and notify one responder, recording the result instead of
    /// failing.
    async fn deliver_to_master<F, Fut>(&self, master_id: u64, notify: F) -> RecipientOutcome
    where
        F: FnOnce(User) -> Fut,
        Fut: Future<Output = NotificationResult<u64>>,
    {
        let (user_id, result) = match self.master_owner(master_id).await {
            Ok(owner) => (Some(owner.id), notify(owner).await),
            Err(e) => (None, Err(e)),
        };

        let outcome = match result {
            Ok(id) => DeliveryOutcome::Sent(id),
            Err(e) => {
                warn!(master_id, user_id = ?user_id, error = %e, "Failed to notify responder");
                DeliveryOutcome::Failed(e.to_string())
            }
        };

        RecipientOutcome {
            master_id,
            user_id,
            outcome,
        }
    }

    /// Like `send_listing_updated_notification`, but every responder is
    /// attempted and gets its own outcome.
    ///
    /// The bus handlers keep the fail-fast operation. This one is for callers
    /// that need per-recipient results, such as an admin resend or a batch
    /// job.
    #[instrument(skip(self))]
    pub async fn deliver_listing_updated(&self, ticket_id: u64) -> NotificationResult<Vec<RecipientOutcome>> {
        let ticket = self.tickets.get_ticket_by_id(ticket_id).await?;
        let responds = self.tickets.get_ticket_responds(ticket_id).await?;

        let mut outcomes = Vec::with_capacity(responds.len());
        for respond in &responds {
            let ticket = &ticket;
            outcomes.push(
                self.deliver_to_master(respond.master_id, |owner| async move {
                    self.notify_ticket_updated(ticket, &owner).await
                })
                .await,
            );
        }

        Ok(outcomes)
    }

    /// Like `send_listing_withdrawn_notification`, but every responder is
    /// attempted and gets its own outcome.
    ///
    /// The bus handlers keep the fail-fast operation. This one is for callers
    /// that need per-recipient results, such as an admin resend or a batch
    /// job.
    #[instrument(skip(self, event), fields(ticket_owner_id = event.ticket_owner_id))]
    pub async fn deliver_listing_withdrawn(
        &self,
        event: &TicketDeleted,
    ) -> NotificationResult<Vec<RecipientOutcome>> {
        let ticket_owner = self.sso.get_user_by_id(event.ticket_owner_id).await?;

        let mut outcomes = Vec::with_capacity(event.responded_masters_ids.len());
        for &master_id in &event.responded_masters_ids {
            let ticket_owner = &ticket_owner;
            outcomes.push(
                self.deliver_to_master(master_id, |owner| async move {
                    self.notify_ticket_deleted(event, ticket_owner, &owner).await
                })
                .await,
            );
        }

        Ok(outcomes)
    }
}

#[async_trait]
impl<S, T, K, E, M> NotificationUseCases for NotificationService<S, T, K, E, M>
where
    S: SsoRepository,
    T: ToysRepository,
    K: TicketsRepository,
    E: EmailsRepository,
    M: EmailSender,
{
    #[instrument(skip(self))]
    async fn send_verification_email(&self, user_id: u64) -> NotificationResult<u64> {
        let user = self.sso.get_user_by_id(user_id).await?;

        let builder = &self.builders.verify_email;
        self.send_and_log(&user, &builder.subject(), builder.body(&user))
            .await
    }

    #[instrument(skip(self, new_password))]
    async fn send_password_reset_email(
        &self,
        user_id: u64,
        new_password: &str,
    ) -> NotificationResult<u64> {
        let user = self.sso.get_user_by_id(user_id).await?;

        let builder = &self.builders.forget_password;
        self.send_and_log(&user, &builder.subject(), builder.body(&user, new_password))
            .await
    }

    /// Fail-fast: the first failing responder ends the fan-out. Emails
    /// already sent stay logged.
    #[instrument(skip(self))]
    async fn send_listing_updated_notification(
        &self,
        ticket_id: u64,
    ) -> NotificationResult<Vec<u64>> {
        let ticket = self.tickets.get_ticket_by_id(ticket_id).await?;
        let responds = self.tickets.get_ticket_responds(ticket_id).await?;

        let mut ids = Vec::with_capacity(responds.len());
        for respond in &responds {
            let owner = self.master_owner(respond.master_id).await?;
            ids.push(self.notify_ticket_updated(&ticket, &owner).await?);
        }

        Ok(ids)
    }

    /// Fail-fast, same as the update fan-out.
    #[instrument(skip(self, event), fields(ticket_owner_id = event.ticket_owner_id))]
    async fn send_listing_withdrawn_notification(
        &self,
        event: TicketDeleted,
    ) -> NotificationResult<Vec<u64>> {
        let ticket_owner = self.sso.get_user_by_id(event.ticket_owner_id).await?;

        let mut ids = Vec::with_capacity(event.responded_masters_ids.len());
        for &master_id in &event.responded_masters_ids {
            let owner = self.master_owner(master_id).await?;
            ids.push(
                self.notify_ticket_deleted(&event, &ticket_owner, &owner)
                    .await?,
            );
        }

        Ok(ids)
    }

    async fn get_user_email_communications(
        &self,
        user_id: u64,
        pagination: Option<Pagination>,
    ) -> NotificationResult<Vec<Email>> {
        self.emails
            .get_user_communications(user_id, pagination)
            .await
    }

    async fn count_user_email_communications(&self, user_id: u64) -> NotificationResult<u64> {
        self.emails.count_user_communications(user_id).await
    }
}
