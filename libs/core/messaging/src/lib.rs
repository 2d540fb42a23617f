//! Bounded worker pools over message-bus subscriptions.
//!
//! A [`WorkerPool`] owns one subject. It pulls messages from a [`MessageSource`],
//! buffers them in a bounded queue and hands each one to a [`MessageHandler`]
//! while never running more than `concurrency` handlers at once.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐     ┌──────────────┐     ┌─────────────────┐
//! │ MessageSource │────▶│ bounded queue│────▶│ dispatcher      │
//! │ (NATS / mem)  │     │ (capacity Q) │     │ (N permits)     │
//! └───────────────┘     └──────────────┘     └─────────────────┘
//!                                                    │
//!                                                    ▼
//!                                           ┌─────────────────┐
//!                                           │ MessageHandler  │
//!                                           └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use messaging::{PoolConfig, WorkerPool};
//! use messaging::nats::NatsSource;
//!
//! let config = PoolConfig::new("users.verify-email").with_concurrency(4);
//! let source = NatsSource::connect("nats://localhost:4222", &config).await?;
//!
//! let pool = WorkerPool::new(config, VerifyEmailHandler::new(service))?;
//! pool.run(source).await?;
//!
//! // ... on shutdown
//! pool.stop().await?;
//! ```

// Handler panics are caught at the task boundary, which needs unwinding.
#[cfg(panic = "abort")]
compile_error!("messaging requires panic = \"unwind\"; handler panics must not abort the process");

mod config;
mod error;
mod handler;
pub mod health;
pub mod metrics;
mod pool;
mod source;

#[cfg(feature = "nats")]
pub mod nats;

pub use config::PoolConfig;
pub use error::PoolError;
pub use handler::MessageHandler;
pub use health::{HealthServer, HealthState, HealthStatus};
pub use metrics::{init_metrics, PoolMetrics};
pub use pool::WorkerPool;
pub use source::{ChannelSource, InboundMessage, MessageSource};
