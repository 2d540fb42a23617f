//! Email content builders.
//!
//! One trait per event kind. Builders are pure: the same input always gives
//! byte-identical output, which is what ends up in both the SMTP message and
//! the communication log.

mod account;
mod tickets;

pub use account::{ForgetPasswordTemplate, VerifyEmailTemplate};
pub use tickets::{TicketDeletedTemplate, TicketUpdatedTemplate};

use crate::config::LinkBases;
use crate::error::{NotificationError, NotificationResult};
use crate::events::TicketDeleted;
use crate::models::{RawTicket, User};
use std::sync::Arc;

#[cfg_attr(test, mockall::automock)]
pub trait VerifyEmailContentBuilder: Send + Sync {
    fn subject(&self) -> String;
    fn body(&self, user: &User) -> String;
}

#[cfg_attr(test, mockall::automock)]
pub trait ForgetPasswordContentBuilder: Send + Sync {
    fn subject(&self) -> String;
    /// The new password is rendered in plaintext.
    fn body(&self, user: &User, new_password: &str) -> String;
}

#[cfg_attr(test, mockall::automock)]
pub trait TicketUpdatedContentBuilder: Send + Sync {
    fn subject(&self, ticket: &RawTicket) -> String;
    fn body(&self, ticket: &RawTicket, respond_owner: &User) -> String;
}

#[cfg_attr(test, mockall::automock)]
pub trait TicketDeletedContentBuilder: Send + Sync {
    fn subject(&self, event: &TicketDeleted) -> String;
    fn body(&self, event: &TicketDeleted, ticket_owner: &User, respond_owner: &User) -> String;
}

/// The four builders the orchestrator renders with.
#[derive(Clone)]
pub struct ContentBuilders {
    pub verify_email: Arc<dyn VerifyEmailContentBuilder>,
    pub forget_password: Arc<dyn ForgetPasswordContentBuilder>,
    pub ticket_updated: Arc<dyn TicketUpdatedContentBuilder>,
    pub ticket_deleted: Arc<dyn TicketDeletedContentBuilder>,
}

impl ContentBuilders {
    /// The stock templates, linking to the given bases.
    pub fn from_links(links: &LinkBases) -> NotificationResult<Self> {
        Ok(Self {
            verify_email: Arc::new(VerifyEmailTemplate::new(&links.verify_email)?),
            forget_password: Arc::new(ForgetPasswordTemplate::new(&links.forget_password)?),
            ticket_updated: Arc::new(TicketUpdatedTemplate::new(&links.update_ticket)?),
            ticket_deleted: Arc::new(TicketDeletedTemplate::new(&links.delete_ticket)?),
        })
    }
}

/// Accept only absolute http(s) bases; a trailing slash is dropped so
/// `{base}/{id}` never doubles it.
fn url_base(raw: &str) -> NotificationResult<String> {
    let base = raw.trim().trim_end_matches('/');
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(NotificationError::InvalidConfig(format!(
            "link base must be an http(s) URL, got '{}'",
            raw
        )));
    }
    Ok(base.to_string())
}

/// ` на сумму <b>{price:.2} руб.</b>` or nothing.
fn price_info(price: Option<f32>) -> String {
    price
        .map(|price| format!(" на сумму <b>{:.2} руб.</b>", price))
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::DateTime;

    pub fn user(id: u64, display_name: &str, email: &str) -> User {
        User {
            id,
            display_name: display_name.to_string(),
            email: email.to_string(),
            email_confirmed: false,
            phone: None,
            phone_confirmed: false,
            telegram: None,
            telegram_confirmed: false,
            avatar: None,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }

    pub fn ticket(id: u64, user_id: u64, price: Option<f32>) -> RawTicket {
        RawTicket {
            id,
            user_id,
            category_id: 1,
            name: "Bear".to_string(),
            description: "Plush bear".to_string(),
            price,
            quantity: 2,
            tag_ids: vec![],
            attachments: vec![],
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_base_trims_trailing_slash() {
        assert_eq!(
            url_base("http://localhost:8090/tickets/").unwrap(),
            "http://localhost:8090/tickets"
        );
    }

    #[test]
    fn test_url_base_rejects_relative() {
        let err = url_base("/tickets").unwrap_err();
        assert!(matches!(err, NotificationError::InvalidConfig(_)));
        assert!(url_base("").is_err());
    }

    #[test]
    fn test_price_info() {
        assert_eq!(price_info(None), "");
        assert_eq!(price_info(Some(150.75)), " на сумму <b>150.75 руб.</b>");
        assert_eq!(price_info(Some(99.99)), " на сумму <b>99.99 руб.</b>");
        assert_eq!(price_info(Some(5.0)), " на сумму <b>5.00 руб.</b>");
    }

    #[test]
    fn test_from_links_rejects_bad_base() {
        let links = LinkBases {
            verify_email: "http://localhost:8090/sso/verify-email".into(),
            forget_password: "http://localhost:8090/sso/login".into(),
            update_ticket: "tickets".into(),
            delete_ticket: "http://localhost:8090/users".into(),
        };
        assert!(ContentBuilders::from_links(&links).is_err());
    }
}
