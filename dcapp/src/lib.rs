//! # dcapp
//!
//! Terminal accelerometer screen. Shows the linear acceleration measured by the device
//! (gravity removed) and publishes the raw samples to an MQTT broker chosen by the user.

pub mod app;
pub mod cli;
pub mod device;
pub mod display;
pub mod prompt;
pub mod screen;
pub mod settings;
