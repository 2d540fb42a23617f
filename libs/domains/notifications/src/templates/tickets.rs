use super::{TicketDeletedContentBuilder, TicketUpdatedContentBuilder, price_info, url_base};
use crate::error::NotificationResult;
use crate::events::TicketDeleted;
use crate::models::{RawTicket, User};

/// Sent to every master who responded to a changed ticket.
pub struct TicketUpdatedTemplate {
    url_base: String,
}

impl TicketUpdatedTemplate {
    pub fn new(base: &str) -> NotificationResult<Self> {
        Ok(Self {
            url_base: url_base(base)?,
        })
    }
}

impl TicketUpdatedContentBuilder for TicketUpdatedTemplate {
    fn subject(&self, ticket: &RawTicket) -> String {
        format!("Заявка на создание игрушки {} была изменена", ticket.name)
    }

    fn body(&self, ticket: &RawTicket, respond_owner: &User) -> String {
        format!(
            "<p>Добрый день, {owner}!</p>\n\
             <p>Заявка на создание игрушки <b>{name}</b> (<i>{description}</i>) в количестве <b>{quantity} шт.</b>{price_info} была изменена.</p>\n\
             <p>Для большей информации, пожалуйста, перейдите по <a href=\"{base}/{id}\">ссылке</a>.</p>\n\
             <p>С уважением,<br>\n\
             команда Handmade Toys Marketplace.</p>\n",
            owner = respond_owner.display_name,
            name = ticket.name,
            description = ticket.description,
            quantity = ticket.quantity,
            price_info = price_info(ticket.price),
            base = self.url_base,
            id = ticket.id,
        )
    }
}

/// Sent to every master whose respond disappeared with a deleted ticket.
pub struct TicketDeletedTemplate {
    url_base: String,
}

impl TicketDeletedTemplate {
    pub fn new(base: &str) -> NotificationResult<Self> {
        Ok(Self {
            url_base: url_base(base)?,
        })
    }
}

impl TicketDeletedContentBuilder for TicketDeletedTemplate {
    fn subject(&self, event: &TicketDeleted) -> String {
        format!("Заявка на создание игрушки {} была удалена", event.name)
    }

    // The line break after "(<i>..</i>) " keeps its trailing space.
    fn body(&self, event: &TicketDeleted, ticket_owner: &User, respond_owner: &User) -> String {
        format!(
            "<p>Добрый день, {owner}!</p>\n\
             <p>Пользователь <a href=\"{base}/{ticket_owner_id}\">{ticket_owner}</a> удалил заявку на создание игрушки <b>{name}</b> (<i>{description}</i>) \n\
             в количестве <b>{quantity} шт.</b>{price_info}</p>\n\
             <p>В связи с этим был удален ваш отклик на создание данной игрушки.</p>\n\
             <p>С уважением,<br>\n\
             команда Handmade Toys Marketplace.</p>\n",
            owner = respond_owner.display_name,
            base = self.url_base,
            ticket_owner_id = ticket_owner.id,
            ticket_owner = ticket_owner.display_name,
            name = event.name,
            description = event.description,
            quantity = event.quantity,
            price_info = price_info(event.price),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::fixtures::{ticket, user};

    fn deleted(price: Option<f32>) -> TicketDeleted {
        TicketDeleted {
            ticket_owner_id: 1,
            name: "Bear".to_string(),
            description: "Plush bear".to_string(),
            price,
            quantity: 2,
            responded_masters_ids: vec![2],
        }
    }

    #[test]
    fn test_ticket_updated_subject() {
        let builder = TicketUpdatedTemplate::new("http://localhost:8090/tickets").unwrap();
        assert_eq!(
            builder.subject(&ticket(5, 1, None)),
            "Заявка на создание игрушки Bear была изменена"
        );
    }

    #[test]
    fn test_ticket_updated_body_with_price() {
        let builder = TicketUpdatedTemplate::new("http://localhost:8090/tickets").unwrap();

        let expected = "<p>Добрый день, Carol!</p>\n\
            <p>Заявка на создание игрушки <b>Bear</b> (<i>Plush bear</i>) в количестве <b>2 шт.</b> на сумму <b>150.75 руб.</b> была изменена.</p>\n\
            <p>Для большей информации, пожалуйста, перейдите по <a href=\"http://localhost:8090/tickets/5\">ссылке</a>.</p>\n\
            <p>С уважением,<br>\n\
            команда Handmade Toys Marketplace.</p>\n";

        assert_eq!(
            builder.body(&ticket(5, 1, Some(150.75)), &user(3, "Carol", "c@x.com")),
            expected
        );
    }

    #[test]
    fn test_ticket_updated_body_without_price() {
        let builder = TicketUpdatedTemplate::new("http://localhost:8090/tickets").unwrap();
        let body = builder.body(&ticket(5, 1, None), &user(3, "Carol", "c@x.com"));

        assert!(body.contains("<b>2 шт.</b> была изменена."));
        assert!(!body.contains("руб."));
    }

    #[test]
    fn test_ticket_deleted_body_with_price() {
        let builder = TicketDeletedTemplate::new("http://localhost:8090/users").unwrap();
        assert_eq!(
            builder.subject(&deleted(None)),
            "Заявка на создание игрушки Bear была удалена"
        );

        let expected = "<p>Добрый день, Carol!</p>\n\
            <p>Пользователь <a href=\"http://localhost:8090/users/1\">Alice</a> удалил заявку на создание игрушки <b>Bear</b> (<i>Plush bear</i>) \n\
            в количестве <b>2 шт.</b> на сумму <b>99.99 руб.</b></p>\n\
            <p>В связи с этим был удален ваш отклик на создание данной игрушки.</p>\n\
            <p>С уважением,<br>\n\
            команда Handmade Toys Marketplace.</p>\n";

        assert_eq!(
            builder.body(
                &deleted(Some(99.99)),
                &user(1, "Alice", "a@x.com"),
                &user(3, "Carol", "c@x.com"),
            ),
            expected
        );
    }

    #[test]
    fn test_ticket_deleted_body_without_price() {
        let builder = TicketDeletedTemplate::new("http://localhost:8090/users").unwrap();
        let body = builder.body(
            &deleted(None),
            &user(1, "Alice", "a@x.com"),
            &user(3, "Carol", "c@x.com"),
        );

        assert!(body.contains("в количестве <b>2 шт.</b></p>\n"));
        assert!(body.contains("</i>) \n"));
    }
}
