//! Per-call retry for unary RPCs.
//!
//! Every attempt gets its own timeout. Only failures that can succeed on a
//! second try are retried; anything else is returned immediately.

use crate::error::{GrpcError, GrpcResult};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Fixed-attempt retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Total attempts including the first one
  pub attempts: u32,
  /// Timeout applied to each attempt separately
  pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      attempts: 3,
      attempt_timeout: Duration::from_secs(1),
    }
  }
}

impl RetryPolicy {
  pub fn new(attempts: u32, attempt_timeout: Duration) -> Self {
    Self {
      attempts,
      attempt_timeout,
    }
  }

  /// A policy that makes a single attempt
  pub fn no_retry(attempt_timeout: Duration) -> Self {
    Self::new(1, attempt_timeout)
  }
}

/// Codes worth another attempt: the request never reached a healthy server
pub fn is_retryable(code: tonic::Code) -> bool {
  matches!(
    code,
    tonic::Code::Unavailable
      | tonic::Code::DeadlineExceeded
      | tonic::Code::ResourceExhausted
      | tonic::Code::Aborted
  )
}

/// Run `call` until it succeeds, fails with a non-retryable status or the
/// attempts run out. The last failure is returned.
///
/// ## Example
/// ```ignore
/// let response = call_with_retry(policy, "GetMaster", || {
///     let mut client = client.clone();
///     async move { client.get_master(GetMasterIn { id }).await }
/// })
/// .await?;
/// ```
pub async fn call_with_retry<T, F, Fut>(
  policy: RetryPolicy,
  method: &'static str,
  mut call: F,
) -> GrpcResult<T>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T, tonic::Status>>,
{
  let attempts = policy.attempts.max(1);
  let mut attempt = 1;

  loop {
    let error = match tokio::time::timeout(policy.attempt_timeout, call()).await {
      Ok(Ok(value)) => {
        if attempt > 1 {
          debug!(target: "grpc_client", method, attempt, "Call succeeded after retry");
        }
        return Ok(value);
      }
      Ok(Err(status)) if !is_retryable(status.code()) => {
        return Err(GrpcError::Status { method, status });
      }
      Ok(Err(status)) => GrpcError::Status { method, status },
      Err(_) => GrpcError::AttemptTimeout {
        method,
        timeout: policy.attempt_timeout,
      },
    };

    if attempt >= attempts {
      warn!(target: "grpc_client", method, attempts, error = %error, "Retries exhausted");
      return Err(error);
    }

    warn!(
      target: "grpc_client",
      method,
      attempt,
      max_attempts = attempts,
      error = %error,
      "Call failed, retrying"
    );
    attempt += 1;
  }
}
