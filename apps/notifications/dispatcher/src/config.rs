//! Process-wide configuration, assembled from the per-concern configs.

use core_config::server::ServerConfig;
use core_config::{env_parse_or_default, ConfigError, FromEnv};
use database::postgres::PostgresConfig;
use domain_notifications::{ClientsConfig, EmailConfig, NatsConfig};

const DEFAULT_HEALTH_PORT: u16 = 8081;

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub nats: NatsConfig,
    pub clients: ClientsConfig,
    pub email: EmailConfig,
    pub database: PostgresConfig,
    /// gRPC read API listen address.
    pub server: ServerConfig,
    /// HTTP port for /health, /ready and /metrics.
    pub health_port: u16,
}

impl FromEnv for DispatcherConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            nats: NatsConfig::from_env()?,
            clients: ClientsConfig::from_env()?,
            email: EmailConfig::from_env()?,
            database: PostgresConfig::from_env()?,
            server: ServerConfig::from_env()?,
            health_port: env_parse_or_default("HEALTH_PORT", DEFAULT_HEALTH_PORT)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_database_url() {
        temp_env::with_var("DATABASE_URL", None::<&str>, || {
            let err = DispatcherConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnvVar(_)));
        });
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgres://localhost/notifications")),
                ("HEALTH_PORT", None),
                ("PORT", None),
                ("NATS_VERIFY_EMAIL_SUBJECT", None),
            ],
            || {
                let config = DispatcherConfig::from_env().unwrap();
                assert_eq!(config.health_port, 8081);
                assert_eq!(config.server.port, 8040);
                assert_eq!(config.nats.verify_email.subject, "verify-email");
                assert_eq!(config.database.url(), "postgres://localhost/notifications");
            },
        );
    }

    #[test]
    fn test_invalid_health_port() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgres://localhost/notifications")),
                ("HEALTH_PORT", Some("not-a-port")),
            ],
            || {
                let err = DispatcherConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("HEALTH_PORT"));
            },
        );
    }
}
