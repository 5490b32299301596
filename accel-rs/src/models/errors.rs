//! Module errors

use thiserror::Error;

/// Represents the different types of errors that can occur while reading the accelerometer.
#[derive(Debug, Error)]
pub enum AccelError {
    /// No accelerometer could be found.
    #[error("No accelerometer found: {0}")]
    SensorNotFound(String),

    /// Error reading a sample from the device.
    #[error("Error reading accelerometer: {0}")]
    Read(String),

    /// Data read from the device has an unexpected format.
    #[error("Incorrect data format: {0}")]
    IncorrectDataFormat(String),

    /// libiio reported an error.
    #[error("IIO error: {0}")]
    Iio(#[from] industrial_io::Error),

    #[error("{0}")]
    Other(String),
}
