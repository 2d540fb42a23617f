use std::time::Duration;
use thiserror::Error;

pub type GrpcResult<T> = Result<T, GrpcError>;

/// Errors that can occur while creating channels and calling upstream services
#[derive(Error, Debug)]
pub enum GrpcError {
  /// Invalid URI provided for connection
  #[error("Invalid URI: {0}")]
  InvalidUri(#[from] tonic::transport::Error),

  /// Invalid configuration
  #[error("Invalid configuration: {0}")]
  InvalidConfig(String),

  /// The upstream service answered with a non-OK status
  #[error("{method} failed: {status}")]
  Status {
    method: &'static str,
    status: tonic::Status,
  },

  /// A single attempt did not complete in time
  #[error("{method} timed out after {timeout:?}")]
  AttemptTimeout {
    method: &'static str,
    timeout: Duration,
  },
}

impl GrpcError {
  /// Status code reported upstream, if the failure came from a response
  pub fn code(&self) -> Option<tonic::Code> {
    match self {
      GrpcError::Status { status, .. } => Some(status.code()),
      _ => None,
    }
  }
}

impl From<GrpcError> for tonic::Status {
  fn from(err: GrpcError) -> Self {
    match err {
      GrpcError::InvalidUri(_) | GrpcError::InvalidConfig(_) => {
        tonic::Status::invalid_argument(err.to_string())
      }
      GrpcError::Status { status, .. } => status,
      GrpcError::AttemptTimeout { .. } => tonic::Status::deadline_exceeded(err.to_string()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_error_keeps_code() {
    let err = GrpcError::Status {
      method: "GetUser",
      status: tonic::Status::not_found("user 7"),
    };
    assert_eq!(err.code(), Some(tonic::Code::NotFound));
    assert!(err.to_string().starts_with("GetUser failed"));
    assert_eq!(tonic::Status::from(err).code(), tonic::Code::NotFound);
  }

  #[test]
  fn test_timeout_maps_to_deadline_exceeded() {
    let err = GrpcError::AttemptTimeout {
      method: "GetMaster",
      timeout: Duration::from_secs(1),
    };
    assert_eq!(err.code(), None);
    assert_eq!(tonic::Status::from(err).code(), tonic::Code::DeadlineExceeded);
  }
}
