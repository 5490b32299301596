use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::watch;

use crate::models::config::BroadcastConfig;
use crate::models::status::ConnectionStatus;

/// State of a publishing service visible from outside its task
pub(crate) struct ServiceState {
    running: AtomicBool,
    publish_rate_millis: AtomicU64,
    broker_address: Mutex<Option<String>>,
    status: watch::Sender<ConnectionStatus>,
}

impl Default for ServiceState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceState {
    pub(crate) fn new() -> Self {
        let (status, _) = watch::channel(ConnectionStatus::default());
        Self {
            running: AtomicBool::new(false),
            publish_rate_millis: AtomicU64::new(0),
            broker_address: Mutex::new(None),
            status,
        }
    }

    pub(crate) fn begin(&self, config: &BroadcastConfig) {
        self.running.store(true, Ordering::SeqCst);
        self.publish_rate_millis
            .store(config.rate.millis(), Ordering::SeqCst);
        *self.broker_address.lock().unwrap_or_else(|e| e.into_inner()) =
            config.broker_address.clone();
        self.set_status(ConnectionStatus::Connecting);
    }

    pub(crate) fn end(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.set_status(ConnectionStatus::Disconnected);
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn publish_rate_millis(&self) -> u64 {
        self.publish_rate_millis.load(Ordering::SeqCst)
    }

    pub(crate) fn broker_address(&self) -> Option<String> {
        self.broker_address
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(crate) fn status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    pub(crate) fn set_status(&self, status: ConnectionStatus) {
        if *self.status.borrow() != status {
            log::info!("Connection status: {status}");
        }
        self.status.send_replace(status);
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }
}
