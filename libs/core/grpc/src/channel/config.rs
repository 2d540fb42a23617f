use std::time::Duration;
use tonic::transport::Endpoint;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(30);

/// Transport settings for a collaborator channel.
///
/// Per-call deadlines live in [`crate::RetryPolicy`]. The connect timeout
/// here only bounds establishing the TCP/HTTP2 connection, and should not be
/// longer than one retry attempt or the attempt timeout fires first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
  pub connect_timeout: Duration,
  /// HTTP/2 PING interval; `None` disables keep-alive.
  pub keep_alive_interval: Option<Duration>,
  pub tcp_nodelay: bool,
}

impl Default for ChannelConfig {
  fn default() -> Self {
    Self {
      connect_timeout: DEFAULT_CONNECT_TIMEOUT,
      keep_alive_interval: Some(DEFAULT_KEEP_ALIVE),
      tcp_nodelay: true,
    }
  }
}

impl ChannelConfig {
  pub fn new() -> Self {
    Self::default()
  }

  /// Defaults, with the connect timeout capped at one retry attempt.
  pub fn for_attempt_timeout(attempt_timeout: Duration) -> Self {
    Self::default().with_connect_timeout(attempt_timeout.min(DEFAULT_CONNECT_TIMEOUT))
  }

  pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
    self.connect_timeout = timeout;
    self
  }

  pub fn without_keep_alive(mut self) -> Self {
    self.keep_alive_interval = None;
    self
  }

  pub(crate) fn apply_to_endpoint(&self, endpoint: Endpoint) -> Endpoint {
    let endpoint = endpoint
      .connect_timeout(self.connect_timeout)
      .tcp_nodelay(self.tcp_nodelay);

    match self.keep_alive_interval {
      Some(interval) => endpoint
        .http2_keep_alive_interval(interval)
        .keep_alive_while_idle(true),
      None => endpoint,
    }
  }
}
