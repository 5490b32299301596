pub mod gravity;

pub use crate::types::filters::gravity::GravityFilter;
