// Emulates an accelerometer lying flat on a table: gravity along z plus optional
// Gaussian noise on every axis.

mod gaussian;

use async_trait::async_trait;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

use common::constants::STANDARD_GRAVITY;
use common::types::{Sample3D, XYZ};
use common::IMUSample;
use publisher::{Publishable, Publisher};

use crate::models::errors::AccelError;
use crate::ports::AccelerometerPort;
use gaussian::GaussianNoise;

const GAUSSIAN_SENSOR_MEAN: f64 = 0f64;
const GAUSSIAN_SENSOR_STDEV: f64 = 0.5;

/// Configures mock data acquisition
pub struct AccelerometerMock {
    gravity: XYZ,
    sensor_noise: Option<GaussianNoise>,
    timestamp: Mutex<f64>,
    tag: String,
}

impl AccelerometerMock {
    pub fn new(tag: &str, add_sensor_noise: bool) -> Result<Self, AccelError> {
        let sensor_noise = if add_sensor_noise {
            Some(GaussianNoise::new(
                GAUSSIAN_SENSOR_MEAN,
                GAUSSIAN_SENSOR_STDEV,
            )?)
        } else {
            None
        };
        Ok(Self {
            gravity: XYZ::new([0.0, 0.0, STANDARD_GRAVITY]),
            sensor_noise,
            timestamp: Mutex::new(0f64),
            tag: tag.to_string(),
        })
    }

    /// Returns the next sample, `period` seconds after the previous one
    async fn next_sample(&self, rng: &mut StdRng, period: Duration) -> Sample3D {
        let mut timestamp = self.timestamp.lock().await;
        *timestamp += period.as_secs_f64();

        let measurement = match &self.sensor_noise {
            Some(noise) => noise.add_noise(rng, self.gravity),
            None => self.gravity,
        };
        Sample3D::from_measurement(*timestamp, measurement)
    }
}

#[async_trait]
impl AccelerometerPort for AccelerometerMock {
    async fn start(
        &self,
        period: Duration,
        abort_signal: Arc<Notify>,
        publisher: Publisher<Sample3D>,
    ) -> Result<(), AccelError> {
        log::info!("Generating mock accelerometer data...");
        let mut rng = StdRng::from_entropy();
        let mut interval = tokio::time::interval(period);

        loop {
            tokio::select! {
                _ = abort_signal.notified() => {
                    break;
                }

                _ = interval.tick() => {
                    let sample = self.next_sample(&mut rng, period).await;
                    publisher.notify_listeners(Arc::new(sample));
                }
            }
        }

        log::info!("Mock accelerometer stopped");
        Ok(())
    }

    fn get_tag(&self) -> &str {
        &self.tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use publisher::Listener;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_mock_without_noise_reports_gravity() {
        let mock = AccelerometerMock::new("Test", false).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let period = Duration::from_millis(100);

        let first = mock.next_sample(&mut rng, period).await;
        let second = mock.next_sample(&mut rng, period).await;

        assert_eq!(first.get_measurement().inner(), [0.0, 0.0, STANDARD_GRAVITY]);
        assert!((first.get_timestamp() - 0.1).abs() < 1e-9);
        assert!((second.get_timestamp() - 0.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_mock_with_noise() {
        let mock = AccelerometerMock::new("Test", true).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let sample = mock.next_sample(&mut rng, Duration::from_millis(100)).await;
        let z = sample.get_measurement().z();
        assert!((z - STANDARD_GRAVITY).abs() < 10.0 * GAUSSIAN_SENSOR_STDEV);
    }

    #[tokio::test]
    async fn test_mock_start_stop() {
        let mock = Arc::new(AccelerometerMock::new("Test", false).unwrap());
        let publisher = Publisher::new();
        let received = Arc::new(std::sync::Mutex::new(0usize));

        let mut listener = {
            let received = received.clone();
            Listener::new(move |_id: Uuid, _sample: Arc<Sample3D>| {
                *received.lock().unwrap() += 1;
            })
        };
        publisher.register_listener(&mut listener);

        let abort_signal = Arc::new(Notify::new());
        let shutdown_signal = abort_signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            shutdown_signal.notify_one();
        });

        mock.start(Duration::from_millis(50), abort_signal, publisher)
            .await
            .unwrap();

        assert!(*received.lock().unwrap() > 0);
    }
}
