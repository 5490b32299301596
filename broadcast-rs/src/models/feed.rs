use std::sync::{Arc, RwLock};
use uuid::Uuid;

use common::types::Sample3D;
use publisher::{listener, Listener};

/// Latest accelerometer sample, written by the sensor listener and read by the publisher.
#[derive(Clone, Default)]
pub struct SampleFeed {
    latest: Arc<RwLock<Option<Sample3D>>>,
}

impl SampleFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, sample: Sample3D) {
        let mut latest = self.latest.write().unwrap_or_else(|e| e.into_inner());
        *latest = Some(sample);
    }

    pub fn latest(&self) -> Option<Sample3D> {
        self.latest
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn process_sample(&self, _id: Uuid, sample: Arc<Sample3D>) {
        self.update((*sample).clone());
    }

    /// Listener that keeps this feed up to date
    pub fn listener(&self) -> Listener<Sample3D> {
        let feed = self.clone();
        listener!(feed.process_sample)
    }
}
