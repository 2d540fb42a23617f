//! Notifications Domain
//!
//! Turns marketplace events into emails and keeps a log of every email sent.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐      ┌─────────────────┐
//! │  NATS subjects  │      │  EmailsService  │  ← gRPC read API
//! └────────┬────────┘      └────────┬────────┘
//!          │                        │
//! ┌────────▼────────┐               │
//! │  Bus handlers   │  ← decode JSON, log and drop failures
//! └────────┬────────┘               │
//!          │                        │
//! ┌────────▼────────────────────────▼┐
//! │       NotificationService        │  ← resolve, render, send, log
//! └──┬──────────┬──────────┬─────────┘
//!    │          │          │
//!  sso/toys/  content    SMTP ──▶ emails log (Postgres)
//!  tickets    builders
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_notifications::{ContentBuilders, NotificationService, NotificationUseCases};
//!
//! let service = NotificationService::new(sso, toys, tickets, emails, sender, builders);
//! let email_id = service.send_verification_email(user_id).await?;
//! ```

pub mod clients;
pub mod config;
pub mod conversions;
pub mod entity;
pub mod error;
pub mod events;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod providers;
pub mod repository;
pub mod service;
pub mod templates;

pub use clients::{GrpcSsoRepository, GrpcTicketsRepository, GrpcToysRepository};
pub use config::{ClientsConfig, EmailConfig, NatsConfig};
pub use error::{NotificationError, NotificationResult};
pub use events::{BusEvent, Event, ForgetPassword, TicketDeleted, TicketUpdated, VerifyEmail};
pub use handlers::{
    EmailsGrpcService, ForgetPasswordHandler, TicketDeletedHandler, TicketUpdatedHandler,
    VerifyEmailHandler,
};
pub use models::{DeliveryOutcome, Email, NewEmail, Pagination, RecipientOutcome, User};
pub use postgres::PgEmailsRepository;
pub use providers::{EmailSender, SmtpEmailSender};
pub use repository::{EmailsRepository, SsoRepository, TicketsRepository, ToysRepository};
pub use service::{NotificationService, NotificationUseCases};
pub use templates::ContentBuilders;
