//! # Crate accel-rs
//!
//! ## accel-rs
//!
//! The `accel-rs` crate reads the device accelerometer and hands every sample to the
//! registered listeners.
//!
//! Features include:
//! - Reading the accel channels of a Linux IIO device through libiio, scaled to m/s^2 and
//!   rotated by the mount matrix when the driver exposes one.
//! - A mock accelerometer producing gravity plus optional Gaussian noise.
//! - Selection of the polling period.
//! - Registration of listeners to receive sensor data once read.

pub(crate) mod adapters;
pub mod constants;
pub mod models;
pub mod ports;
pub mod services;

pub use adapters::iio::IioAccelerometer;
pub use adapters::mock::AccelerometerMock;
pub use models::errors::AccelError;
