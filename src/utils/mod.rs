//! Utility Module
//!
//! - [`OrbitControls`]: Camera orbit controller for interactive viewing
//! - [`Clock`]: Frame delta measurement

pub mod orbit_control;
pub mod time;

pub use orbit_control::OrbitControls;
pub use time::Clock;
