//! Module errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BroadcastError {
    /// A publisher is already running; it must be stopped first.
    #[error("Broadcast service is already running")]
    AlreadyRunning,

    /// No broker address was provided.
    #[error("No broker address configured")]
    MissingAddress,

    /// Broker address couldn't be interpreted as `host:port`.
    #[error("Invalid broker address: {0}")]
    InvalidAddress(String),

    #[error("Error publishing data: {0}")]
    Publish(String),
}
