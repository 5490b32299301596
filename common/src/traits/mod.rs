pub mod imu;
pub mod publisher;

pub use crate::traits::imu::{IMUFilter, IMUSample, IMUSource, IMUUntimedSample};
pub use crate::traits::publisher::Notifiable;
