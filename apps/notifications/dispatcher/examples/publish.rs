//! Test publisher for the notification dispatcher
//!
//! Run with: cargo run -p notifications_dispatcher --example publish -- <event> [id]
//!
//! `<event>` is one of `verify-email`, `forget-password`, `update-ticket` or
//! `delete-ticket`. Subjects and the NATS URL come from the same environment
//! variables the dispatcher reads.

use core_config::FromEnv;
use domain_notifications::config::NatsConfig;
use domain_notifications::{ForgetPassword, TicketDeleted, TicketUpdated, VerifyEmail};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let event = args.next().unwrap_or_else(|| "verify-email".to_string());
    let id: u64 = args.next().map(|v| v.parse::<u64>()).transpose()?.unwrap_or(1);

    let config = NatsConfig::from_env()?;

    let (subject, payload) = match event.as_str() {
        "verify-email" => (
            &config.verify_email.subject,
            serde_json::to_vec(&VerifyEmail { user_id: id })?,
        ),
        "forget-password" => (
            &config.forget_password.subject,
            serde_json::to_vec(&ForgetPassword {
                user_id: id,
                new_password: "new-password".to_string(),
            })?,
        ),
        "update-ticket" => (
            &config.update_ticket.subject,
            serde_json::to_vec(&TicketUpdated { ticket_id: id })?,
        ),
        "delete-ticket" => (
            &config.delete_ticket.subject,
            serde_json::to_vec(&TicketDeleted {
                ticket_owner_id: id,
                name: "test ticket".to_string(),
                description: "test description".to_string(),
                price: Some(112.0),
                quantity: 1,
                responded_masters_ids: vec![1],
            })?,
        ),
        other => return Err(format!("Unknown event '{}'", other).into()),
    };

    println!("Connecting to NATS at {}...", config.url);
    let client = async_nats::ConnectOptions::new()
        .name("notifications-dispatcher-publisher")
        .connect(&config.url)
        .await?;

    println!("Publishing {} to {}", event, subject);
    client.publish(subject.clone(), payload.into()).await?;
    client.flush().await?;

    println!("Published! Check the dispatcher logs and the emails table");
    Ok(())
}
