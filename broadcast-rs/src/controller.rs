//! Keeps at most one publisher running while its configuration changes.
//!
//! Every change stops the active publisher (if any) and starts a new one with the
//! updated configuration. Address changes restart after a fixed delay so the previous
//! connection can be torn down first; rate changes restart immediately.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::constants::NO_ADDRESS;
use crate::models::config::{BroadcastConfig, PublishRate};
use crate::models::errors::BroadcastError;
use crate::ports::BroadcastPort;

pub struct BroadcastController {
    port: Arc<dyn BroadcastPort>,
    device_id: String,
    broker_address: Option<String>,
    rate: PublishRate,
    restart_delay: Duration,
    pending_restart: Option<JoinHandle<()>>,
}

impl BroadcastController {
    pub fn new(
        port: Arc<dyn BroadcastPort>,
        device_id: &str,
        rate: PublishRate,
        restart_delay: Duration,
    ) -> Self {
        Self {
            port,
            device_id: device_id.to_string(),
            broker_address: None,
            rate,
            restart_delay,
            pending_restart: None,
        }
    }

    /// Adopts the broker address of an already running publisher.
    /// Returns true when no publisher is running and an address must be requested.
    pub fn attach(&mut self) -> bool {
        if self.port.is_running() {
            self.broker_address = self.port.broker_address();
            log::info!(
                "Attached to running broadcast service ({})",
                self.broker_address.as_deref().unwrap_or(NO_ADDRESS)
            );
            false
        } else {
            true
        }
    }

    /// Selects publish rate `index` and restarts the publisher right away.
    /// Returns false, without touching the publisher, if that rate is already selected.
    pub async fn change_rate(&mut self, index: usize) -> Result<bool, BroadcastError> {
        let rate = PublishRate::new(index);
        if rate == self.rate {
            return Ok(false);
        }
        self.cancel_pending_restart().await;
        self.stop_if_running().await?;
        self.rate = rate;
        self.port.start(self.config()).await?;
        Ok(true)
    }

    /// Stores `address` as is and restarts the publisher once the restart delay elapses
    pub async fn confirm_address(&mut self, address: &str) -> Result<(), BroadcastError> {
        self.cancel_pending_restart().await;
        self.stop_if_running().await?;
        self.broker_address = Some(address.to_string());
        self.port.mark_connecting();

        let port = self.port.clone();
        let config = self.config();
        let delay = self.restart_delay;
        self.pending_restart = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = port.start(config).await {
                log::error!("Error restarting broadcast: {e}");
            }
        }));
        Ok(())
    }

    /// Dismisses the address prompt. The publisher is left untouched.
    /// Returns the address to display.
    pub fn cancel_address(&mut self) -> &str {
        self.broker_address
            .get_or_insert_with(|| NO_ADDRESS.to_string())
            .as_str()
    }

    pub fn config(&self) -> BroadcastConfig {
        BroadcastConfig {
            device_id: self.device_id.clone(),
            broker_address: self.broker_address.clone(),
            rate: self.rate,
        }
    }

    pub fn broker_address(&self) -> Option<&str> {
        self.broker_address.as_deref()
    }

    pub fn rate(&self) -> PublishRate {
        self.rate
    }

    pub fn port(&self) -> &Arc<dyn BroadcastPort> {
        &self.port
    }

    /// True while an address change is waiting for its delayed restart
    pub fn restart_pending(&self) -> bool {
        self.pending_restart
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Drops any pending restart and stops the publisher
    pub async fn shutdown(&mut self) -> Result<(), BroadcastError> {
        self.cancel_pending_restart().await;
        self.stop_if_running().await
    }

    async fn stop_if_running(&self) -> Result<(), BroadcastError> {
        if self.port.is_running() {
            self.port.stop().await?;
        }
        Ok(())
    }

    /// Aborts the pending restart and waits for it, so a start already in progress has
    /// either completed or never happened when this returns.
    async fn cancel_pending_restart(&mut self) {
        let Some(handle) = self.pending_restart.take() else {
            return;
        };
        if !handle.is_finished() {
            log::debug!("Dropping pending broadcast restart");
        }
        handle.abort();
        if let Err(e) = handle.await {
            if !e.is_cancelled() {
                log::error!("Pending broadcast restart failed: {e}");
            }
        }
    }
}
