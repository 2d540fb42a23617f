//! Email transport.
//!
//! `EmailSender` is the only thing the orchestrator knows about delivery;
//! `SmtpEmailSender` is the production implementation.

mod smtp;

pub use smtp::SmtpEmailSender;

use crate::error::NotificationResult;
use async_trait::async_trait;

/// Sends one HTML email to a list of recipients.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// All `recipients` go into `To`. Succeeds only when the server accepted
    /// the message.
    async fn send(&self, subject: &str, body: &str, recipients: &[String]) -> NotificationResult<()>;
}
