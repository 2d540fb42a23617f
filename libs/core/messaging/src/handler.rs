//! Handler trait for inbound messages.

use crate::source::InboundMessage;
use async_trait::async_trait;

/// Message handler trait.
///
/// A handler owns the whole life of a message once the pool hands it over:
/// decoding, acting on it and reporting failures. There is no ack or retry
/// channel back to the pool, so handlers log their own errors.
///
/// # Example
///
/// ```rust,ignore
/// struct AuditHandler;
///
/// #[async_trait]
/// impl MessageHandler for AuditHandler {
///     async fn handle(&self, message: &InboundMessage) {
///         tracing::info!(subject = %message.subject, bytes = message.payload.len(), "Audited");
///     }
///
///     fn name(&self) -> &'static str {
///         "audit_handler"
///     }
/// }
/// ```
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    /// Handle one message.
    async fn handle(&self, message: &InboundMessage);

    /// Get the handler name.
    ///
    /// Used for logging and metrics labels.
    fn name(&self) -> &'static str;
}
