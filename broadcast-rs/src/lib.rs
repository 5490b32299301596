//! # Crate broadcast-rs
//!
//! ## broadcast-rs
//!
//! Background publishing of accelerometer samples to a message broker, and the controller
//! that keeps at most one publisher running while the user changes its configuration.
//!
//! - [`ports::BroadcastPort`] is the start/stop surface of a publishing service.
//! - [`MqttBroadcaster`] publishes the latest sample as JSON to an MQTT broker at the
//!   selected rate.
//! - [`BroadcastMock`] records every start/stop it receives.
//! - [`BroadcastController`] restarts the publisher on address or rate changes.

pub(crate) mod adapters;
pub mod constants;
pub mod controller;
pub mod models;
pub mod ports;

pub use adapters::mock::{BroadcastCall, BroadcastMock};
pub use adapters::mqtt::MqttBroadcaster;
pub use controller::BroadcastController;
pub use models::config::{BroadcastConfig, PublishRate};
pub use models::errors::BroadcastError;
pub use models::feed::SampleFeed;
pub use models::status::ConnectionStatus;
