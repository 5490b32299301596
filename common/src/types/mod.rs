pub mod callback;
pub mod filters;
pub mod timed;
pub mod untimed;

pub use callback::Callback;
pub use timed::Sample3D;
pub use untimed::XYZ;
