use async_trait::async_trait;
use std::ops::{Add, Mul, Sub};
use uuid::Uuid;

use crate::traits::Notifiable;

/// Untimed sample from an IMU (Inertial Measurement Unit).
pub trait IMUUntimedSample:
    Send
    + Sync
    + Clone
    + Default
    + Add<Output = Self>
    + Mul<f64, Output = Self>
    + Sub<Output = Self>
    + 'static
{
    ///  Returns the measurement data as a vector of `f64` values.
    fn get_measurement(&self) -> Vec<f64>;
}

/// Timed sample from an IMU (Inertial Measurement Unit).
pub trait IMUSample: Send + Sync + Clone + Default + 'static {
    type Untimed: IMUUntimedSample;

    ///  Returns the timestamp of the sample in seconds.
    fn get_timestamp(&self) -> f64;
    ///  Returns the measurement data
    fn get_measurement(&self) -> Self::Untimed;
    /// Returns a IMUSample
    fn from_measurement(timestamp: f64, measurement: Self::Untimed) -> Self;
}

/// Filtering for IMU (Inertial Measurement Unit) samples.
pub trait IMUFilter<T: IMUUntimedSample>: Send + Sync {
    /// Returns the filtered samples
    fn filter(&mut self, samples: Vec<T>) -> Vec<T>;
}

/// Producer of IMU samples that listeners can subscribe to.
#[async_trait]
pub trait IMUSource<T>: Send + Sync {
    fn get_tag(&self) -> &str;
    async fn register_listener(&self, listener: &mut dyn Notifiable<T>) -> Uuid;
    async fn unregister_listener(&self, id: Uuid);
}
