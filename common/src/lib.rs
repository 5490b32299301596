//! General functionality shared by the `dcapp` crates: sample types, the gravity filter
//! and the traits that connect sensor sources with their listeners.

pub mod constants;

#[doc(hidden)]
pub mod traits;
#[doc(hidden)]
pub mod types;

// Re-export traits
#[doc(inline)]
pub use traits::{IMUFilter, IMUSample, IMUSource, IMUUntimedSample, Notifiable};

// Re-export types
#[doc(inline)]
pub use types::filters::GravityFilter;
#[doc(inline)]
pub use types::timed::Sample3D;
#[doc(inline)]
pub use types::untimed::XYZ;
