use std::time::Duration;

use crate::constants::PUBLISH_RATES_MILLIS;

/// Index into [`PUBLISH_RATES_MILLIS`]. Indices past the end of the table are clamped to
/// the fastest preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PublishRate(usize);

impl PublishRate {
    pub fn new(index: usize) -> Self {
        Self(index.min(PUBLISH_RATES_MILLIS.len() - 1))
    }

    pub fn index(&self) -> usize {
        self.0
    }

    pub fn millis(&self) -> u64 {
        PUBLISH_RATES_MILLIS[self.0]
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.millis())
    }
}

/// Configuration handed by value to the publishing service on every start
#[derive(Clone, Debug, PartialEq)]
pub struct BroadcastConfig {
    pub device_id: String,
    pub broker_address: Option<String>,
    pub rate: PublishRate,
}
