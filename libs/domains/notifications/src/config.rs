//! Environment-driven configuration for the dispatcher's collaborators.

use core_config::{ConfigError, FromEnv, env_flag, env_or_default, env_parse_or_default};
use grpc_client::RetryPolicy;
use grpc_client::channel::endpoint_uri;
use messaging::PoolConfig;
use std::time::Duration;

// ============================================================================
// NATS
// ============================================================================

/// One consumed subject and the name its worker announces on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectConfig {
    pub subject: String,
    pub worker_name: String,
}

impl SubjectConfig {
    fn from_env(prefix: &str, default_subject: &str) -> Self {
        let subject = env_or_default(&format!("NATS_{}_SUBJECT", prefix), default_subject);
        let worker_name = env_or_default(
            &format!("NATS_{}_WORKER_NAME", prefix),
            &format!("{}-worker", subject),
        );
        Self {
            subject,
            worker_name,
        }
    }
}

/// Bus connection and the four consumed subjects.
#[derive(Debug, Clone)]
pub struct NatsConfig {
    pub url: String,
    /// Handlers running at once, per subject
    pub concurrency: usize,
    /// Intake queue length, per subject
    pub queue_capacity: usize,
    pub verify_email: SubjectConfig,
    pub forget_password: SubjectConfig,
    pub update_ticket: SubjectConfig,
    pub delete_ticket: SubjectConfig,
}

impl NatsConfig {
    /// Pool settings for one of this config's subjects.
    pub fn pool_config(&self, subject: &SubjectConfig) -> PoolConfig {
        PoolConfig::new(subject.subject.clone())
            .with_concurrency(self.concurrency)
            .with_queue_capacity(self.queue_capacity)
            .with_consumer_name(subject.worker_name.clone())
    }
}

/// - `NATS_URL` (default: nats://0.0.0.0:4222)
/// - `NATS_GOROUTINES_POOL_SIZE` (default: 1)
/// - `NATS_MESSAGE_CHANNEL_BUFFER_SIZE` (default: 1)
/// - `NATS_<KIND>_SUBJECT` / `NATS_<KIND>_WORKER_NAME` for
///   `VERIFY_EMAIL`, `FORGET_PASSWORD`, `UPDATE_TICKET`, `DELETE_TICKET`
impl FromEnv for NatsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_or_default("NATS_URL", "nats://0.0.0.0:4222"),
            concurrency: env_parse_or_default("NATS_GOROUTINES_POOL_SIZE", 1)?,
            queue_capacity: env_parse_or_default("NATS_MESSAGE_CHANNEL_BUFFER_SIZE", 1)?,
            verify_email: SubjectConfig::from_env("VERIFY_EMAIL", "verify-email"),
            forget_password: SubjectConfig::from_env("FORGET_PASSWORD", "forget-password"),
            update_ticket: SubjectConfig::from_env("UPDATE_TICKET", "update-ticket"),
            delete_ticket: SubjectConfig::from_env("DELETE_TICKET", "delete-ticket"),
        })
    }
}

// ============================================================================
// gRPC collaborators
// ============================================================================

/// Address and retry policy of one collaborating service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorConfig {
    pub host: String,
    pub port: u16,
    /// Total attempts per call
    pub retries: u32,
    /// Timeout of each attempt
    pub retry_timeout: Duration,
}

impl CollaboratorConfig {
    fn from_env(prefix: &str, default_port: u16) -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or_default(&format!("{}_CLIENT_HOST", prefix), "0.0.0.0"),
            port: env_parse_or_default(&format!("{}_CLIENT_PORT", prefix), default_port)?,
            retries: env_parse_or_default(&format!("{}_RETRIES_COUNT", prefix), 3)?,
            retry_timeout: Duration::from_secs(env_parse_or_default(
                &format!("{}_RETRIES_TIMEOUT", prefix),
                1,
            )?),
        })
    }

    pub fn uri(&self) -> String {
        endpoint_uri(&self.host, self.port)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, self.retry_timeout)
    }
}

/// Identity, catalog and request-board services.
#[derive(Debug, Clone)]
pub struct ClientsConfig {
    pub sso: CollaboratorConfig,
    pub toys: CollaboratorConfig,
    pub tickets: CollaboratorConfig,
}

/// `<SSO|TOYS|TICKETS>_CLIENT_HOST`, `_CLIENT_PORT` (8070/8060/8050),
/// `_RETRIES_COUNT` (3), `_RETRIES_TIMEOUT` in seconds (1).
impl FromEnv for ClientsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            sso: CollaboratorConfig::from_env("SSO", 8070)?,
            toys: CollaboratorConfig::from_env("TOYS", 8060)?,
            tickets: CollaboratorConfig::from_env("TICKETS", 8050)?,
        })
    }
}

// ============================================================================
// Email
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub login: String,
    pub password: String,
    /// Sender address; derived from the login when unset
    pub from: Option<String>,
    /// Relay with STARTTLS instead of a plain connection
    pub tls: bool,
}

impl SmtpConfig {
    /// `from` if set, else the login when it is already an address, else
    /// `login@host`.
    pub fn from_address(&self) -> String {
        match &self.from {
            Some(from) => from.clone(),
            None if self.login.contains('@') => self.login.clone(),
            None => format!("{}@{}", self.login, self.host),
        }
    }
}

/// Link targets embedded in the email bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBases {
    pub verify_email: String,
    pub forget_password: String,
    pub update_ticket: String,
    pub delete_ticket: String,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp: SmtpConfig,
    pub links: LinkBases,
}

/// - `EMAIL_SMTP_HOST` (default: smtp.freesmtpservers.com), `EMAIL_SMTP_PORT` (25)
/// - `EMAIL_SMTP_LOGIN` / `EMAIL_SMTP_PASSWORD` (smtp / smtp)
/// - `EMAIL_SMTP_FROM` (default: `<login>@<host>`), `EMAIL_SMTP_TLS` (false)
/// - `EMAIL_VERIFY_URL`, `FORGET_PASSWORD_URL`, `UPDATE_TICKET_URL`, `DELETE_TICKET_URL`
impl FromEnv for EmailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let from = std::env::var("EMAIL_SMTP_FROM")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Ok(Self {
            smtp: SmtpConfig {
                host: env_or_default("EMAIL_SMTP_HOST", "smtp.freesmtpservers.com"),
                port: env_parse_or_default("EMAIL_SMTP_PORT", 25)?,
                login: env_or_default("EMAIL_SMTP_LOGIN", "smtp"),
                password: env_or_default("EMAIL_SMTP_PASSWORD", "smtp"),
                from,
                tls: env_flag("EMAIL_SMTP_TLS"),
            },
            links: LinkBases {
                verify_email: env_or_default(
                    "EMAIL_VERIFY_URL",
                    "http://localhost:8090/sso/verify-email",
                ),
                forget_password: env_or_default(
                    "FORGET_PASSWORD_URL",
                    "http://localhost:8090/sso/login",
                ),
                update_ticket: env_or_default("UPDATE_TICKET_URL", "http://localhost:8090/tickets"),
                delete_ticket: env_or_default("DELETE_TICKET_URL", "http://localhost:8090/users"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NATS_VARS: [&str; 11] = [
        "NATS_URL",
        "NATS_GOROUTINES_POOL_SIZE",
        "NATS_MESSAGE_CHANNEL_BUFFER_SIZE",
        "NATS_VERIFY_EMAIL_SUBJECT",
        "NATS_VERIFY_EMAIL_WORKER_NAME",
        "NATS_FORGET_PASSWORD_SUBJECT",
        "NATS_FORGET_PASSWORD_WORKER_NAME",
        "NATS_UPDATE_TICKET_SUBJECT",
        "NATS_UPDATE_TICKET_WORKER_NAME",
        "NATS_DELETE_TICKET_SUBJECT",
        "NATS_DELETE_TICKET_WORKER_NAME",
    ];

    #[test]
    fn test_nats_config_defaults() {
        temp_env::with_vars_unset(NATS_VARS, || {
            let config = NatsConfig::from_env().unwrap();
            assert_eq!(config.url, "nats://0.0.0.0:4222");
            assert_eq!(config.concurrency, 1);
            assert_eq!(config.queue_capacity, 1);
            assert_eq!(config.verify_email.subject, "verify-email");
            assert_eq!(config.forget_password.subject, "forget-password");
            assert_eq!(config.update_ticket.subject, "update-ticket");
            assert_eq!(config.delete_ticket.subject, "delete-ticket");
            assert_eq!(config.delete_ticket.worker_name, "delete-ticket-worker");
        });
    }

    #[test]
    fn test_nats_config_overrides() {
        temp_env::with_vars(
            [
                ("NATS_URL", Some("nats://bus:4222")),
                ("NATS_GOROUTINES_POOL_SIZE", Some("8")),
                ("NATS_MESSAGE_CHANNEL_BUFFER_SIZE", Some("32")),
                ("NATS_UPDATE_TICKET_SUBJECT", Some("tickets.updated")),
                ("NATS_UPDATE_TICKET_WORKER_NAME", None),
                ("NATS_VERIFY_EMAIL_WORKER_NAME", Some("verifier")),
            ],
            || {
                let config = NatsConfig::from_env().unwrap();
                assert_eq!(config.url, "nats://bus:4222");
                assert_eq!(config.update_ticket.subject, "tickets.updated");
                assert_eq!(config.update_ticket.worker_name, "tickets.updated-worker");

                let pool = config.pool_config(&config.verify_email);
                assert_eq!(pool.concurrency, 8);
                assert_eq!(pool.queue_capacity, 32);
                assert_eq!(pool.consumer_name, "verifier");
                assert!(pool.validate().is_ok());
            },
        );
    }

    #[test]
    fn test_nats_config_invalid_pool_size() {
        temp_env::with_var("NATS_GOROUTINES_POOL_SIZE", Some("lots"), || {
            let err = NatsConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("NATS_GOROUTINES_POOL_SIZE"));
        });
    }

    #[test]
    fn test_clients_config_defaults() {
        temp_env::with_vars_unset(
            [
                "SSO_CLIENT_HOST",
                "SSO_CLIENT_PORT",
                "SSO_RETRIES_COUNT",
                "SSO_RETRIES_TIMEOUT",
                "TOYS_CLIENT_PORT",
                "TICKETS_CLIENT_PORT",
            ],
            || {
                let config = ClientsConfig::from_env().unwrap();
                assert_eq!(config.sso.uri(), "http://0.0.0.0:8070");
                assert_eq!(config.toys.port, 8060);
                assert_eq!(config.tickets.port, 8050);
                assert_eq!(
                    config.sso.retry_policy(),
                    RetryPolicy::new(3, Duration::from_secs(1))
                );
            },
        );
    }

    #[test]
    fn test_clients_config_overrides() {
        temp_env::with_vars(
            [
                ("TOYS_CLIENT_HOST", Some("toys")),
                ("TOYS_CLIENT_PORT", Some("9000")),
                ("TOYS_RETRIES_COUNT", Some("5")),
                ("TOYS_RETRIES_TIMEOUT", Some("2")),
            ],
            || {
                let config = ClientsConfig::from_env().unwrap();
                assert_eq!(config.toys.uri(), "http://toys:9000");
                assert_eq!(config.toys.retry_policy().attempts, 5);
                assert_eq!(
                    config.toys.retry_policy().attempt_timeout,
                    Duration::from_secs(2)
                );
            },
        );
    }

    #[test]
    fn test_email_config_defaults() {
        temp_env::with_vars_unset(
            [
                "EMAIL_SMTP_HOST",
                "EMAIL_SMTP_PORT",
                "EMAIL_SMTP_LOGIN",
                "EMAIL_SMTP_PASSWORD",
                "EMAIL_SMTP_FROM",
                "EMAIL_SMTP_TLS",
                "EMAIL_VERIFY_URL",
                "FORGET_PASSWORD_URL",
                "UPDATE_TICKET_URL",
                "DELETE_TICKET_URL",
            ],
            || {
                let config = EmailConfig::from_env().unwrap();
                assert_eq!(config.smtp.host, "smtp.freesmtpservers.com");
                assert_eq!(config.smtp.port, 25);
                assert_eq!(config.smtp.from_address(), "smtp@smtp.freesmtpservers.com");
                assert!(!config.smtp.tls);
                assert_eq!(
                    config.links.verify_email,
                    "http://localhost:8090/sso/verify-email"
                );
                assert_eq!(config.links.forget_password, "http://localhost:8090/sso/login");
                assert_eq!(config.links.update_ticket, "http://localhost:8090/tickets");
                assert_eq!(config.links.delete_ticket, "http://localhost:8090/users");
            },
        );
    }

    #[test]
    fn test_email_config_from_and_tls() {
        temp_env::with_vars(
            [
                ("EMAIL_SMTP_LOGIN", Some("mailer")),
                ("EMAIL_SMTP_FROM", Some("noreply@toys.example")),
                ("EMAIL_SMTP_TLS", Some("true")),
                ("EMAIL_SMTP_PORT", Some("587")),
            ],
            || {
                let config = EmailConfig::from_env().unwrap();
                assert_eq!(config.smtp.from_address(), "noreply@toys.example");
                assert_eq!(config.smtp.port, 587);
                assert!(config.smtp.tls);
            },
        );
    }
}
