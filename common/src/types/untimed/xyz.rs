use nalgebra::Vector3;
use std::ops::{Add, Mul, Sub};

use crate::constants::N_XYZ_COORDINATES;
use crate::traits::IMUUntimedSample;

/// Three axis measurement, in m/s^2 for accelerometers
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
pub struct XYZ(Vector3<f64>);

impl XYZ {
    pub fn new(data: [f64; N_XYZ_COORDINATES]) -> Self {
        Self(Vector3::from(data))
    }

    pub fn from_vector(data: Vector3<f64>) -> Self {
        Self(data)
    }

    pub fn inner(&self) -> [f64; N_XYZ_COORDINATES] {
        self.0.into()
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn z(&self) -> f64 {
        self.0.z
    }

    /// Component-wise absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }
}

impl IMUUntimedSample for XYZ {
    fn get_measurement(&self) -> Vec<f64> {
        self.inner().to_vec()
    }
}

impl From<[f64; N_XYZ_COORDINATES]> for XYZ {
    fn from(value: [f64; N_XYZ_COORDINATES]) -> Self {
        Self::new(value)
    }
}

impl From<XYZ> for Vec<f64> {
    fn from(value: XYZ) -> Self {
        value.get_measurement()
    }
}

impl TryFrom<&[f64]> for XYZ {
    type Error = &'static str;

    fn try_from(value: &[f64]) -> Result<Self, Self::Error> {
        let data: [f64; N_XYZ_COORDINATES] =
            value.try_into().map_err(|_| "Expected 3 coordinates")?;
        Ok(Self::new(data))
    }
}

impl Add for XYZ {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for XYZ {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for XYZ {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}
