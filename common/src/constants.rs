pub const N_XYZ_COORDINATES: usize = 3;

/// Standard gravity [m/s^2]
pub const STANDARD_GRAVITY: f64 = 9.80665;
