pub mod mock;
pub mod mqtt;
