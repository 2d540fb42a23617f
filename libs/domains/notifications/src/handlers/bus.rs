//! One [`MessageHandler`] per subscribed subject.
//!
//! Handlers decode the JSON payload and call the orchestrator. Nothing is
//! acknowledged or retried: undecodable messages and failed notifications are
//! logged and dropped.

use async_trait::async_trait;
use messaging::{InboundMessage, MessageHandler};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::NotificationResult;
use crate::events::{BusEvent, ForgetPassword, TicketDeleted, TicketUpdated, VerifyEmail};
use crate::service::NotificationUseCases;

fn decode<E: DeserializeOwned>(message: &InboundMessage) -> NotificationResult<E> {
    Ok(serde_json::from_slice(&message.payload)?)
}

/// Decode the payload, logging and dropping it when it does not parse.
fn decode_or_log<E: BusEvent>(message: &InboundMessage) -> Option<E> {
    match decode(message) {
        Ok(event) => Some(event),
        Err(e) => {
            error!(
                subject = %message.subject,
                kind = E::KIND,
                error = %e,
                "Failed to unmarshal {} message",
                message.subject
            );
            None
        }
    }
}

pub struct VerifyEmailHandler<N> {
    service: Arc<N>,
}

impl<N: NotificationUseCases> VerifyEmailHandler<N> {
    pub fn new(service: Arc<N>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<N: NotificationUseCases + 'static> MessageHandler for VerifyEmailHandler<N> {
    async fn handle(&self, message: &InboundMessage) {
        let Some(event) = decode_or_log::<VerifyEmail>(message) else {
            return;
        };

        match self.service.send_verification_email(event.user_id).await {
            Ok(email_id) => debug!(user_id = event.user_id, email_id, "Verification email sent"),
            Err(e) => error!(
                subject = %message.subject,
                kind = VerifyEmail::KIND,
                user_id = event.user_id,
                error = %e,
                "Failed to send {} message",
                message.subject
            ),
        }
    }

    fn name(&self) -> &'static str {
        "verify_email_handler"
    }
}

pub struct ForgetPasswordHandler<N> {
    service: Arc<N>,
}

impl<N: NotificationUseCases> ForgetPasswordHandler<N> {
    pub fn new(service: Arc<N>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<N: NotificationUseCases + 'static> MessageHandler for ForgetPasswordHandler<N> {
    async fn handle(&self, message: &InboundMessage) {
        let Some(event) = decode_or_log::<ForgetPassword>(message) else {
            return;
        };

        // The password itself never reaches the logs.
        match self
            .service
            .send_password_reset_email(event.user_id, &event.new_password)
            .await
        {
            Ok(email_id) => debug!(user_id = event.user_id, email_id, "Password reset email sent"),
            Err(e) => error!(
                subject = %message.subject,
                kind = ForgetPassword::KIND,
                user_id = event.user_id,
                error = %e,
                "Failed to send {} message",
                message.subject
            ),
        }
    }

    fn name(&self) -> &'static str {
        "forget_password_handler"
    }
}

pub struct TicketUpdatedHandler<N> {
    service: Arc<N>,
}

impl<N: NotificationUseCases> TicketUpdatedHandler<N> {
    pub fn new(service: Arc<N>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<N: NotificationUseCases + 'static> MessageHandler for TicketUpdatedHandler<N> {
    async fn handle(&self, message: &InboundMessage) {
        let Some(event) = decode_or_log::<TicketUpdated>(message) else {
            return;
        };

        match self
            .service
            .send_listing_updated_notification(event.ticket_id)
            .await
        {
            Ok(ids) => debug!(ticket_id = event.ticket_id, sent = ids.len(), "Ticket update notifications sent"),
            Err(e) => error!(
                subject = %message.subject,
                kind = TicketUpdated::KIND,
                ticket_id = event.ticket_id,
                error = %e,
                "Failed to send {} message",
                message.subject
            ),
        }
    }

    fn name(&self) -> &'static str {
        "ticket_updated_handler"
    }
}

pub struct TicketDeletedHandler<N> {
    service: Arc<N>,
}

impl<N: NotificationUseCases> TicketDeletedHandler<N> {
    pub fn new(service: Arc<N>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<N: NotificationUseCases + 'static> MessageHandler for TicketDeletedHandler<N> {
    async fn handle(&self, message: &InboundMessage) {
        let Some(event) = decode_or_log::<TicketDeleted>(message) else {
            return;
        };

        let ticket_owner_id = event.ticket_owner_id;
        let responded_masters_ids = event.responded_masters_ids.clone();

        match self.service.send_listing_withdrawn_notification(event).await {
            Ok(ids) => debug!(ticket_owner_id, sent = ids.len(), "Ticket deletion notifications sent"),
            Err(e) => error!(
                subject = %message.subject,
                kind = TicketDeleted::KIND,
                ticket_owner_id,
                responded_masters_ids = ?responded_masters_ids,
                error = %e,
                "Failed to send {} message",
                message.subject
            ),
        }
    }

    fn name(&self) -> &'static str {
        "ticket_deleted_handler"
    }
}
