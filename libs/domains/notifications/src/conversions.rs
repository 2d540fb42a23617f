//! Wire (protobuf) ↔ domain conversions.

use grpc_client::conversions::{datetime_to_timestamp, timestamp_to_datetime};
use protos::{notifications as pb_notifications, sso, tickets, toys};

use crate::models::{Email, Master, Pagination, RawTicket, Respond, TicketAttachment, User};

impl From<sso::GetUserOut> for User {
    fn from(user: sso::GetUserOut) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
            email: user.email,
            email_confirmed: user.email_confirmed,
            phone: user.phone,
            phone_confirmed: user.phone_confirmed,
            telegram: user.telegram,
            telegram_confirmed: user.telegram_confirmed,
            avatar: user.avatar,
            created_at: timestamp_to_datetime(user.created_at),
            updated_at: timestamp_to_datetime(user.updated_at),
        }
    }
}

impl From<toys::GetMasterOut> for Master {
    fn from(master: toys::GetMasterOut) -> Self {
        Self {
            id: master.id,
            user_id: master.user_id,
            info: master.info,
            created_at: timestamp_to_datetime(master.created_at),
            updated_at: timestamp_to_datetime(master.updated_at),
        }
    }
}

impl From<tickets::TicketAttachment> for TicketAttachment {
    fn from(attachment: tickets::TicketAttachment) -> Self {
        Self {
            id: attachment.id,
            ticket_id: attachment.ticket_id,
            link: attachment.link,
            created_at: timestamp_to_datetime(attachment.created_at),
            updated_at: timestamp_to_datetime(attachment.updated_at),
        }
    }
}

impl From<tickets::GetTicketOut> for RawTicket {
    fn from(ticket: tickets::GetTicketOut) -> Self {
        Self {
            id: ticket.id,
            user_id: ticket.user_id,
            category_id: ticket.category_id,
            name: ticket.name,
            description: ticket.description,
            price: ticket.price,
            quantity: ticket.quantity,
            tag_ids: ticket.tag_ids,
            attachments: ticket.attachments.into_iter().map(Into::into).collect(),
            created_at: timestamp_to_datetime(ticket.created_at),
            updated_at: timestamp_to_datetime(ticket.updated_at),
        }
    }
}

impl From<tickets::GetRespondOut> for Respond {
    fn from(respond: tickets::GetRespondOut) -> Self {
        Self {
            id: respond.id,
            ticket_id: respond.ticket_id,
            master_id: respond.master_id,
            price: respond.price,
            comment: respond.comment,
            created_at: timestamp_to_datetime(respond.created_at),
            updated_at: timestamp_to_datetime(respond.updated_at),
        }
    }
}

impl From<Email> for pb_notifications::Email {
    fn from(email: Email) -> Self {
        Self {
            id: email.id,
            user_id: email.user_id,
            email: email.email,
            content: email.content,
            sent_at: datetime_to_timestamp(email.sent_at),
        }
    }
}

impl From<pb_notifications::Pagination> for Pagination {
    fn from(pagination: pb_notifications::Pagination) -> Self {
        Self {
            limit: pagination.limit,
            offset: pagination.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_ticket_from_proto() {
        let ticket: RawTicket = tickets::GetTicketOut {
            id: 5,
            user_id: 1,
            category_id: 3,
            name: "Bear".into(),
            description: "Plush".into(),
            price: None,
            quantity: 2,
            created_at: 1_702_209_600,
            updated_at: 1_702_209_660,
            tag_ids: vec![1, 4],
            attachments: vec![tickets::TicketAttachment {
                id: 9,
                ticket_id: 5,
                link: "https://cdn/bear.png".into(),
                created_at: 1_702_209_600,
                updated_at: 1_702_209_600,
            }],
        }
        .into();

        assert_eq!(ticket.price, None);
        assert_eq!(ticket.tag_ids, vec![1, 4]);
        assert_eq!(ticket.attachments.len(), 1);
        assert_eq!(ticket.attachments[0].link, "https://cdn/bear.png");
        assert_eq!(
            ticket.created_at,
            Utc.with_ymd_and_hms(2023, 12, 10, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_user_optional_fields() {
        let user: User = sso::GetUserOut {
            id: 1,
            display_name: "Alice".into(),
            email: "a@x.com".into(),
            telegram: Some("@alice".into()),
            ..Default::default()
        }
        .into();

        assert_eq!(user.telegram.as_deref(), Some("@alice"));
        assert_eq!(user.phone, None);
        assert_eq!(user.avatar, None);
    }

    #[test]
    fn test_email_to_proto() {
        let sent_at = Utc.with_ymd_and_hms(2023, 12, 10, 12, 0, 0).unwrap();
        let proto: pb_notifications::Email = Email {
            id: 10,
            user_id: 1,
            email: "a@x.com".into(),
            content: "<p>hi</p>".into(),
            sent_at,
        }
        .into();

        assert_eq!(proto.id, 10);
        assert_eq!(proto.sent_at, 1_702_209_600);
    }
}
