//! Error types for the notifications domain.

use thiserror::Error;

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors that can occur while dispatching or reading notifications.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Bus payload is not the JSON shape the handler expects.
    #[error("Failed to decode message: {0}")]
    Decode(#[from] serde_json::Error),

    /// A collaborating service failed or was unreachable.
    #[error("{service} request failed: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    /// Building or sending the email failed.
    #[error("Email transport error: {0}")]
    Transport(String),

    /// Reading or writing the communication log failed.
    #[error("Database error: {0}")]
    Persistence(String),

    /// Configuration error (URL base, SMTP settings).
    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}

impl NotificationError {
    pub fn upstream(service: &'static str, err: impl std::fmt::Display) -> Self {
        NotificationError::Upstream {
            service,
            message: err.to_string(),
        }
    }
}

impl From<sea_orm::DbErr> for NotificationError {
    fn from(err: sea_orm::DbErr) -> Self {
        NotificationError::Persistence(err.to_string())
    }
}

impl From<lettre::error::Error> for NotificationError {
    fn from(err: lettre::error::Error) -> Self {
        NotificationError::Transport(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for NotificationError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        NotificationError::Transport(err.to_string())
    }
}

impl From<NotificationError> for tonic::Status {
    fn from(err: NotificationError) -> Self {
        tonic::Status::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_from_serde() {
        let err: NotificationError = serde_json::from_slice::<u64>(b"{").unwrap_err().into();
        assert!(matches!(err, NotificationError::Decode(_)));
        assert!(err.to_string().starts_with("Failed to decode message"));
    }

    #[test]
    fn test_upstream_error_display() {
        let err = NotificationError::upstream("sso", "user 7 not found");
        assert_eq!(err.to_string(), "sso request failed: user 7 not found");
    }

    #[test]
    fn test_db_error_maps_to_persistence() {
        let err: NotificationError = sea_orm::DbErr::Custom("pool closed".into()).into();
        assert!(matches!(err, NotificationError::Persistence(ref m) if m.contains("pool closed")));
    }

    #[test]
    fn test_status_is_internal() {
        let status: tonic::Status = NotificationError::Persistence("down".into()).into();
        assert_eq!(status.code(), tonic::Code::Internal);
    }
}
