// In-memory publishing service. Nothing is sent anywhere; every start/stop is recorded
// so the restart sequences issued by the controller can be checked.

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::watch;

use crate::models::config::BroadcastConfig;
use crate::models::errors::BroadcastError;
use crate::models::state::ServiceState;
use crate::models::status::ConnectionStatus;
use crate::ports::BroadcastPort;

#[derive(Clone, Debug, PartialEq)]
pub enum BroadcastCall {
    Start(BroadcastConfig),
    Stop,
}

#[derive(Default)]
pub struct BroadcastMock {
    state: ServiceState,
    calls: Mutex<Vec<BroadcastCall>>,
}

impl BroadcastMock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that is already publishing with `config`, as if it had been started by a
    /// previous controller.
    pub fn running(config: BroadcastConfig) -> Self {
        let mock = Self::new();
        mock.state.begin(&config);
        mock.state.set_status(ConnectionStatus::Connected);
        mock
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<BroadcastCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, call: BroadcastCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl BroadcastPort for BroadcastMock {
    async fn start(&self, config: BroadcastConfig) -> Result<(), BroadcastError> {
        if self.state.is_running() {
            return Err(BroadcastError::AlreadyRunning);
        }
        self.record(BroadcastCall::Start(config.clone()));
        self.state.begin(&config);
        let status = match config.broker_address {
            Some(_) => ConnectionStatus::Connected,
            None => ConnectionStatus::Failed,
        };
        self.state.set_status(status);
        Ok(())
    }

    async fn stop(&self) -> Result<(), BroadcastError> {
        self.record(BroadcastCall::Stop);
        self.state.end();
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.state.is_running()
    }

    fn status(&self) -> ConnectionStatus {
        self.state.status()
    }

    fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.state.subscribe()
    }

    fn mark_connecting(&self) {
        self.state.set_status(ConnectionStatus::Connecting);
    }

    fn publish_rate_millis(&self) -> u64 {
        self.state.publish_rate_millis()
    }

    fn broker_address(&self) -> Option<String> {
        self.state.broker_address()
    }
}
