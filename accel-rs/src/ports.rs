use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use async_trait::async_trait;

use common::types::Sample3D;
use publisher::Publisher;

use crate::models::errors::AccelError;

#[async_trait]
pub trait AccelerometerPort: Send + Sync {
    /// Polls the accelerometer every `period` and notifies each sample to `publisher`
    /// until `abort_signal` is notified.
    async fn start(
        &self,
        period: Duration,
        abort_signal: Arc<Notify>,
        publisher: Publisher<Sample3D>,
    ) -> Result<(), AccelError>;

    fn get_tag(&self) -> &str;
}
