use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use common::types::XYZ;

use crate::models::errors::AccelError;

/// Independent Gaussian noise on every axis
#[derive(Clone, Debug)]
pub(crate) struct GaussianNoise {
    normal: Normal<f64>,
}

impl GaussianNoise {
    pub(crate) fn new(mean: f64, stdev: f64) -> Result<Self, AccelError> {
        let normal = Normal::new(mean, stdev).map_err(|e| AccelError::Other(e.to_string()))?;
        Ok(Self { normal })
    }

    pub(crate) fn add_noise(&self, rng: &mut StdRng, measurement: XYZ) -> XYZ {
        let mut data = measurement.inner();
        for value in data.iter_mut() {
            *value += self.normal.sample(rng);
        }
        XYZ::new(data)
    }
}
