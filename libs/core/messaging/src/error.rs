//! Error types for worker pools.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),

    #[error("Worker pool for subject '{0}' is already running")]
    AlreadyRunning(String),

    #[error("Worker pool for subject '{0}' is not running")]
    NotRunning(String),

    #[error("Subscription error: {0}")]
    Subscription(String),

    #[error("Pool task failed: {0}")]
    TaskFailed(String),
}
