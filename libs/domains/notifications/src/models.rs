//! Data models for the notifications domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Collaborator projections
// ============================================================================

/// A user as projected from the identity (SSO) service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub display_name: String,
    pub email: String,
    pub email_confirmed: bool,
    pub phone: Option<String>,
    pub phone_confirmed: bool,
    pub telegram: Option<String>,
    pub telegram_confirmed: bool,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A craftsperson profile from the catalog (Toys) service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Master {
    pub id: u64,
    /// Owning user; emails go to this user.
    pub user_id: u64,
    pub info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketAttachment {
    pub id: u64,
    pub ticket_id: u64,
    pub link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A listing on the request board, without resolved tags or category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTicket {
    pub id: u64,
    pub user_id: u64,
    pub category_id: u32,
    pub name: String,
    pub description: String,
    pub price: Option<f32>,
    pub quantity: u32,
    pub tag_ids: Vec<u32>,
    pub attachments: Vec<TicketAttachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A master's response to a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Respond {
    pub id: u64,
    pub ticket_id: u64,
    pub master_id: u64,
    pub price: f32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Communication log
// ============================================================================

/// A sent email as recorded in the communication log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id: u64,
    pub user_id: u64,
    pub email: String,
    /// Rendered HTML body, exactly as handed to the transport.
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

/// Insert shape for the communication log; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmail {
    pub user_id: u64,
    pub email: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl NewEmail {
    /// A record stamped with the current time.
    pub fn sent_now(user: &User, content: String) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            content,
            sent_at: Utc::now(),
        }
    }
}

/// Optional LIMIT/OFFSET for log lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Pagination {
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self { limit, offset }
    }
}

// ============================================================================
// Per-recipient delivery
// ============================================================================

/// What happened to one recipient of a fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Sent and logged under this id.
    Sent(u64),
    /// Not sent, or sent but not logged; the error message.
    Failed(String),
}

/// Outcome for one responding master.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientOutcome {
    pub master_id: u64,
    /// Resolved owner of the master, when resolution got that far.
    pub user_id: Option<u64>,
    pub outcome: DeliveryOutcome,
}

impl RecipientOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self.outcome, DeliveryOutcome::Sent(_))
    }

    pub fn email_id(&self) -> Option<u64> {
        match self.outcome {
            DeliveryOutcome::Sent(id) => Some(id),
            DeliveryOutcome::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_email_copies_recipient() {
        let user = User {
            id: 1,
            display_name: "Alice".into(),
            email: "a@x.com".into(),
            email_confirmed: false,
            phone: None,
            phone_confirmed: false,
            telegram: None,
            telegram_confirmed: false,
            avatar: None,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        };

        let before = Utc::now();
        let record = NewEmail::sent_now(&user, "<p>hi</p>".into());

        assert_eq!(record.user_id, 1);
        assert_eq!(record.email, "a@x.com");
        assert_eq!(record.content, "<p>hi</p>");
        assert!(record.sent_at >= before);
    }

    #[test]
    fn test_recipient_outcome_accessors() {
        let sent = RecipientOutcome {
            master_id: 2,
            user_id: Some(3),
            outcome: DeliveryOutcome::Sent(10),
        };
        let failed = RecipientOutcome {
            master_id: 4,
            user_id: None,
            outcome: DeliveryOutcome::Failed("toys request failed".into()),
        };

        assert!(sent.is_sent());
        assert_eq!(sent.email_id(), Some(10));
        assert!(!failed.is_sent());
        assert_eq!(failed.email_id(), None);
    }
}
