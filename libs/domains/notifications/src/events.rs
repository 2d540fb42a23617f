//! Bus payloads, one DTO per subject.
//!
//! All payloads are UTF-8 JSON with snake_case keys.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A payload decoded from one subject.
pub trait BusEvent: DeserializeOwned + Into<Event> {
    /// Stable name for logs, independent of the subject it arrived on.
    const KIND: &'static str;
}

/// `verify-email`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyEmail {
    pub user_id: u64,
}

/// `forget-password`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgetPassword {
    pub user_id: u64,
    pub new_password: String,
}

// Keep the password out of logs and panic messages.
impl std::fmt::Debug for ForgetPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForgetPassword")
            .field("user_id", &self.user_id)
            .field("new_password", &"<redacted>")
            .finish()
    }
}

/// `update-ticket`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketUpdated {
    pub ticket_id: u64,
}

/// `delete-ticket`
///
/// The ticket itself is already gone upstream, so the payload carries
/// everything the email needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketDeleted {
    pub ticket_owner_id: u64,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f32>,
    pub quantity: u32,
    #[serde(default)]
    pub responded_masters_ids: Vec<u64>,
}

/// Any event the dispatcher consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    VerifyEmail(VerifyEmail),
    ForgetPassword(ForgetPassword),
    TicketUpdated(TicketUpdated),
    TicketDeleted(TicketDeleted),
}

impl Event {
    /// Stable name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::VerifyEmail(_) => VerifyEmail::KIND,
            Event::ForgetPassword(_) => ForgetPassword::KIND,
            Event::TicketUpdated(_) => TicketUpdated::KIND,
            Event::TicketDeleted(_) => TicketDeleted::KIND,
        }
    }
}

impl From<VerifyEmail> for Event {
    fn from(event: VerifyEmail) -> Self {
        Event::VerifyEmail(event)
    }
}

impl From<ForgetPassword> for Event {
    fn from(event: ForgetPassword) -> Self {
        Event::ForgetPassword(event)
    }
}

impl From<TicketUpdated> for Event {
    fn from(event: TicketUpdated) -> Self {
        Event::TicketUpdated(event)
    }
}

impl From<TicketDeleted> for Event {
    fn from(event: TicketDeleted) -> Self {
        Event::TicketDeleted(event)
    }
}

impl BusEvent for VerifyEmail {
    const KIND: &'static str = "verify_email";
}

impl BusEvent for ForgetPassword {
    const KIND: &'static str = "forget_password";
}

impl BusEvent for TicketUpdated {
    const KIND: &'static str = "ticket_updated";
}

impl BusEvent for TicketDeleted {
    const KIND: &'static str = "ticket_deleted";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ticket_deleted_without_price() {
        let event: TicketDeleted = serde_json::from_str(
            r#"{"ticket_owner_id":1,"name":"Bear","description":"Plush","quantity":2,"responded_masters_ids":[2,5]}"#,
        )
        .unwrap();

        assert_eq!(event.ticket_owner_id, 1);
        assert_eq!(event.price, None);
        assert_eq!(event.responded_masters_ids, vec![2, 5]);
    }

    #[test]
    fn test_decode_ticket_deleted_with_price() {
        let event: TicketDeleted = serde_json::from_str(
            r#"{"ticket_owner_id":1,"name":"Bear","description":"Plush","price":99.99,"quantity":2,"responded_masters_ids":[]}"#,
        )
        .unwrap();

        assert_eq!(event.price, Some(99.99));
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        assert!(serde_json::from_str::<VerifyEmail>(r#"{"user_id":"one"}"#).is_err());
        assert!(serde_json::from_str::<TicketUpdated>("not json").is_err());
    }

    #[test]
    fn test_forget_password_debug_hides_password() {
        let event = ForgetPassword {
            user_id: 1,
            new_password: "hunter2".into(),
        };
        assert!(!format!("{:?}", event).contains("hunter2"));
    }

    #[test]
    fn test_event_kind() {
        assert_eq!(Event::from(VerifyEmail { user_id: 1 }).kind(), "verify_email");
        assert_eq!(Event::from(TicketUpdated { ticket_id: 1 }).kind(), "ticket_updated");

        let withdrawn = TicketDeleted {
            ticket_owner_id: 1,
            name: "Bear".into(),
            description: "Plush".into(),
            price: None,
            quantity: 1,
            responded_masters_ids: vec![],
        };
        assert_eq!(Event::from(withdrawn).kind(), TicketDeleted::KIND);
        assert_eq!(
            Event::from(ForgetPassword {
                user_id: 1,
                new_password: "x".into(),
            })
            .kind(),
            ForgetPassword::KIND
        );
    }
}
