use async_trait::async_trait;
use log::error;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::adapters::{iio::IioAccelerometer, mock::AccelerometerMock};
use crate::models::errors::AccelError;
use crate::models::shutdown;
use crate::ports::AccelerometerPort;
use common::traits::{IMUSource, Notifiable};
use common::types::Sample3D;
use publisher::{Publishable, Publisher};

/// Configuration of accelerometer service
pub struct AccelerometerService<C>
where
    C: AccelerometerPort,
{
    client: C,
    publisher: Publisher<Sample3D>,
    abort_signal: Arc<Notify>,
}

impl<C> AccelerometerService<C>
where
    C: AccelerometerPort,
{
    pub fn new(client: C) -> Self {
        Self {
            client,
            publisher: Publisher::new(),
            abort_signal: Arc::new(Notify::new()),
        }
    }

    /// Starts the data acquisition process. The process is stopped after `run_for_millis`,
    /// with a SIGINT signal when `run_for_millis` is None, or with [`stop`](Self::stop).
    pub async fn start(
        &self,
        period: Duration,
        run_for_millis: Option<u64>,
    ) -> Result<(), AccelError> {
        let shutdown_handle =
            shutdown::listen_for_shutdown(self.abort_signal.clone(), run_for_millis);
        let result = self
            .client
            .start(period, self.abort_signal.clone(), self.publisher.clone())
            .await;
        shutdown_handle.abort();
        result
    }

    /// Stops the data acquisition process
    pub fn stop(&self) {
        self.abort_signal.notify_one();
    }
}

#[async_trait]
impl<C> IMUSource<Sample3D> for AccelerometerService<C>
where
    C: AccelerometerPort,
{
    fn get_tag(&self) -> &str {
        self.client.get_tag()
    }

    async fn register_listener(&self, listener: &mut dyn Notifiable<Sample3D>) -> Uuid {
        self.publisher.register_listener(listener)
    }

    async fn unregister_listener(&self, id: Uuid) {
        self.publisher.unregister_listener(id);
    }
}

/// Spawns the acquisition loop of `service` and returns its handle together with the service.
fn spawn_service<C>(
    service: AccelerometerService<C>,
    period: Duration,
    run_for_millis: Option<u64>,
) -> (tokio::task::JoinHandle<()>, Arc<AccelerometerService<C>>)
where
    C: AccelerometerPort + 'static,
{
    let service = Arc::new(service);
    let handle = tokio::spawn({
        let service = service.clone();
        async move {
            if let Err(e) = service.start(period, run_for_millis).await {
                error!("Error in accelerometer loop: {}", e);
            }
        }
    });
    (handle, service)
}

/// Starts reading the IIO accelerometer `device`, or the first IIO device with accel
/// channels when `device` is None.
///
/// Returns SensorNotFound if there is no such device. The service runs until
/// Ctrl+C or until [`AccelerometerService::stop`] is called.
///
/// # Returns
///
/// Returns a tuple containing:
/// * A `tokio::task::JoinHandle<()>` representing the spawned asynchronous task.
/// * An `Arc<AccelerometerService<IioAccelerometer>>` instance, allowing listeners to be registered.
pub fn run_service(
    device: Option<&str>,
    tag: &str,
    sampling_period_millis: u64,
) -> Result<
    (
        tokio::task::JoinHandle<()>,
        Arc<AccelerometerService<IioAccelerometer>>,
    ),
    AccelError,
> {
    let accelerometer = IioAccelerometer::discover(device, tag)?;
    Ok(spawn_service(
        AccelerometerService::new(accelerometer),
        Duration::from_millis(sampling_period_millis),
        None,
    ))
}

/// Starts a mock accelerometer that reports gravity, optionally with noise.
/// With `run_for_millis` set to None it runs until Ctrl+C or [`AccelerometerService::stop`].
pub fn run_mock_service(
    tag: &str,
    sampling_period_millis: u64,
    add_sensor_noise: bool,
    run_for_millis: Option<u64>,
) -> Result<
    (
        tokio::task::JoinHandle<()>,
        Arc<AccelerometerService<AccelerometerMock>>,
    ),
    AccelError,
> {
    let accelerometer = AccelerometerMock::new(tag, add_sensor_noise)?;
    Ok(spawn_service(
        AccelerometerService::new(accelerometer),
        Duration::from_millis(sampling_period_millis),
        run_for_millis,
    ))
}
