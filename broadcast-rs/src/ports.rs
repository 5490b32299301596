use async_trait::async_trait;
use tokio::sync::watch;

use crate::models::config::BroadcastConfig;
use crate::models::errors::BroadcastError;
use crate::models::status::ConnectionStatus;

/// Start/stop surface of a background publishing service
#[async_trait]
pub trait BroadcastPort: Send + Sync {
    /// Starts publishing with `config`.
    /// Returns AlreadyRunning if a previous start hasn't been stopped.
    async fn start(&self, config: BroadcastConfig) -> Result<(), BroadcastError>;

    /// Stops the running publisher. Stopping an idle service is a no-op.
    async fn stop(&self) -> Result<(), BroadcastError>;

    fn is_running(&self) -> bool;

    fn status(&self) -> ConnectionStatus;

    /// Receiver notified on every connection status change
    fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus>;

    /// Flags a connection as pending before the service is actually started
    fn mark_connecting(&self);

    /// Publish interval in use, 0 if the service never started
    fn publish_rate_millis(&self) -> u64;

    /// Broker address of the running (or last started) publisher
    fn broker_address(&self) -> Option<String>;
}
