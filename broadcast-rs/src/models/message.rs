use serde::Serialize;

use common::types::Sample3D;
use common::IMUSample;

/// Payload published for every accelerometer sample
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AccelMessage {
    pub device_id: String,
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelMessage {
    pub fn new(device_id: &str, sample: &Sample3D) -> Self {
        let measurement = sample.get_measurement();
        Self {
            device_id: device_id.to_string(),
            timestamp: sample.get_timestamp(),
            x: measurement.x(),
            y: measurement.y(),
            z: measurement.z(),
        }
    }
}
