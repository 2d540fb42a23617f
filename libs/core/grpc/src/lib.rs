//! # gRPC Client Library
//!
//! Channel creation, per-call retry and server health helpers shared by the
//! services that talk to upstream gRPC collaborators.
//!
//! ## Quick Start
//!
//! ```ignore
//! use grpc_client::{call_with_retry, create_channel_lazy, RetryPolicy};
//! use protos::sso::users_service_client::UsersServiceClient;
//!
//! // Returns immediately; the connection is made on the first RPC
//! let channel = create_channel_lazy("http://sso:8070")?;
//! let client = UsersServiceClient::new(channel);
//!
//! let policy = RetryPolicy::new(3, Duration::from_secs(1));
//! let user = call_with_retry(policy, "GetUser", || {
//!     let mut client = client.clone();
//!     async move { client.get_user(GetUserIn { id: 1 }).await }
//! })
//! .await?;
//! ```

pub mod channel;
pub mod conversions;
pub mod error;
pub mod retry;
pub mod server;

// Re-export main types and functions for convenience
pub use channel::{ChannelConfig, create_channel_lazy, create_channel_lazy_with_config};
pub use error::{GrpcError, GrpcResult};
pub use retry::{RetryPolicy, call_with_retry};
