pub mod iio;
pub mod mock;
