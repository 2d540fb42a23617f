//! SMTP transport using lettre.

use super::EmailSender;
use crate::config::SmtpConfig;
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{debug, error, info};

pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    host: String,
}

impl SmtpEmailSender {
    /// Build the transport; nothing is connected until the first send.
    pub fn new(config: &SmtpConfig) -> NotificationResult<Self> {
        let address = config.from_address();
        let from: Mailbox = address.parse().map_err(|e| {
            NotificationError::InvalidConfig(format!(
                "Invalid sender address '{}', set EMAIL_SMTP_FROM: {}",
                address, e
            ))
        })?;

        Ok(Self {
            transport: Self::build_transport(config)?,
            from,
            host: config.host.clone(),
        })
    }

    fn build_transport(config: &SmtpConfig) -> NotificationResult<AsyncSmtpTransport<Tokio1Executor>> {
        let credentials = Credentials::new(config.login.clone(), config.password.clone());

        let transport = if config.tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| {
                    NotificationError::InvalidConfig(format!("Failed to create SMTP relay: {}", e))
                })?
                .port(config.port)
                .credentials(credentials)
                .build()
        } else {
            // Plain connection, the default for port 25
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port)
                .credentials(credentials)
                .build()
        };

        Ok(transport)
    }

    fn build_message(&self, subject: &str, body: &str, recipients: &[String]) -> NotificationResult<Message> {
        if recipients.is_empty() {
            return Err(NotificationError::Transport("No recipients".to_string()));
        }

        let mut builder = Message::builder().from(self.from.clone()).subject(subject);

        for recipient in recipients {
            let to: Mailbox = recipient.parse().map_err(|e| {
                NotificationError::Transport(format!("Invalid recipient '{}': {}", recipient, e))
            })?;
            builder = builder.to(to);
        }

        Ok(builder.header(ContentType::TEXT_HTML).body(body.to_string())?)
    }

    /// Open and close one connection to the server.
    pub async fn check_connection(&self) -> NotificationResult<bool> {
        Ok(self.transport.test_connection().await?)
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, subject: &str, body: &str, recipients: &[String]) -> NotificationResult<()> {
        debug!(host = %self.host, recipients = recipients.len(), "Sending email via SMTP");

        let message = self.build_message(subject, body, recipients)?;

        let response = self.transport.send(message).await.map_err(|e| {
            error!(host = %self.host, error = %e, "Failed to send email via SMTP");
            NotificationError::Transport(format!("SMTP send failed: {}", e))
        })?;

        info!(
            recipients = recipients.len(),
            code = %response.code(),
            "Email sent via SMTP"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig {
            host: "localhost".to_string(),
            port: 2525,
            login: "mailer@toys.example".to_string(),
            password: "secret".to_string(),
            from: None,
            tls: false,
        }
    }

    #[test]
    fn test_new_uses_login_as_sender() {
        let sender = SmtpEmailSender::new(&config()).unwrap();
        assert_eq!(sender.from.email.to_string(), "mailer@toys.example");
    }

    #[test]
    fn test_new_derives_sender_from_bare_login() {
        let mut config = config();
        config.host = "mail.toys.example".to_string();
        config.login = "smtp".to_string();

        let sender = SmtpEmailSender::new(&config).unwrap();
        assert_eq!(sender.from.email.to_string(), "smtp@mail.toys.example");
    }

    #[test]
    fn test_new_rejects_invalid_sender() {
        let mut config = config();
        config.from = Some("not an address".to_string());

        let err = SmtpEmailSender::new(&config).err().unwrap();
        assert!(matches!(err, NotificationError::InvalidConfig(ref m) if m.contains("EMAIL_SMTP_FROM")));
    }

    #[test]
    fn test_default_email_config_builds_sender() {
        use crate::config::EmailConfig;
        use core_config::FromEnv;

        temp_env::with_vars_unset(
            [
                "EMAIL_SMTP_HOST",
                "EMAIL_SMTP_PORT",
                "EMAIL_SMTP_LOGIN",
                "EMAIL_SMTP_PASSWORD",
                "EMAIL_SMTP_FROM",
                "EMAIL_SMTP_TLS",
            ],
            || {
                let config = EmailConfig::from_env().unwrap();
                let sender = SmtpEmailSender::new(&config.smtp).unwrap();
                assert_eq!(
                    sender.from.email.to_string(),
                    "smtp@smtp.freesmtpservers.com"
                );
            },
        );
    }

    #[test]
    fn test_new_with_tls() {
        let mut config = config();
        config.tls = true;
        config.from = Some("noreply@toys.example".to_string());

        assert!(SmtpEmailSender::new(&config).is_ok());
    }

    #[test]
    fn test_build_message_is_html_to_every_recipient() {
        let sender = SmtpEmailSender::new(&config()).unwrap();
        let message = sender
            .build_message(
                "Подтверждение адреса электронной почты",
                "<p>Hi</p>",
                &["a@x.com".to_string(), "b@x.com".to_string()],
            )
            .unwrap();

        assert_eq!(message.envelope().to().len(), 2);

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Content-Type: text/html; charset=utf-8"));
        assert!(raw.contains("<p>Hi</p>"));
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let sender = SmtpEmailSender::new(&config()).unwrap();
        let err = sender
            .build_message("s", "b", &["not an address".to_string()])
            .unwrap_err();
        assert!(matches!(err, NotificationError::Transport(_)));
    }

    #[test]
    fn test_build_message_rejects_no_recipients() {
        let sender = SmtpEmailSender::new(&config()).unwrap();
        assert!(sender.build_message("s", "b", &[]).is_err());
    }
}
