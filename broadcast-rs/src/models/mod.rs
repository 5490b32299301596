pub mod config;
pub mod errors;
pub mod feed;
pub mod message;
pub(crate) mod state;
pub mod status;
