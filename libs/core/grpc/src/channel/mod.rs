pub mod config;

pub use config::ChannelConfig;

use crate::error::{GrpcError, GrpcResult};
use tonic::transport::{Channel, Endpoint};

/// Creates a lazy gRPC channel that connects on first request
///
/// Returns immediately without establishing a connection, so the service can
/// start while its collaborators are still coming up. Connection errors show
/// up on the first RPC, where the caller's retry policy handles them.
///
/// ## Example
/// ```ignore
/// use grpc_client::create_channel_lazy;
/// use protos::toys::masters_service_client::MastersServiceClient;
///
/// let channel = create_channel_lazy("http://toys:8060")?;
/// let client = MastersServiceClient::new(channel);
/// ```
pub fn create_channel_lazy(addr: impl Into<String>) -> GrpcResult<Channel> {
  create_channel_lazy_with_config(addr, ChannelConfig::default())
}

/// Creates a lazy gRPC channel with custom configuration
pub fn create_channel_lazy_with_config(
  addr: impl Into<String>,
  config: ChannelConfig,
) -> GrpcResult<Channel> {
  let addr_string = addr.into();

  let endpoint = Endpoint::from_shared(addr_string.clone()).map_err(|e| {
    tracing::error!(target: "grpc_client", addr = %addr_string, error = ?e, "Invalid URI");
    GrpcError::InvalidUri(e)
  })?;

  let endpoint = config.apply_to_endpoint(endpoint);

  tracing::debug!(
    target: "grpc_client",
    addr = %addr_string,
    connect_timeout = ?config.connect_timeout,
    "Creating lazy gRPC channel (connects on first request)"
  );

  Ok(endpoint.connect_lazy())
}

/// Build the `http://host:port` URI for a collaborator
pub fn endpoint_uri(host: &str, port: u16) -> String {
  if host.starts_with("http://") || host.starts_with("https://") {
    format!("{}:{}", host, port)
  } else {
    format!("http://{}:{}", host, port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_invalid_uri() {
    let result = create_channel_lazy("not a valid uri");
    assert!(matches!(result, Err(GrpcError::InvalidUri(_))));
  }

  #[tokio::test]
  async fn test_lazy_channel_does_not_connect() {
    // Nothing listens here; a lazy channel must still be created.
    let result = create_channel_lazy("http://127.0.0.1:9");
    assert!(result.is_ok());
  }

  #[test]
  fn test_endpoint_uri() {
    assert_eq!(endpoint_uri("0.0.0.0", 8070), "http://0.0.0.0:8070");
    assert_eq!(endpoint_uri("https://sso.internal", 443), "https://sso.internal:443");
  }
}
