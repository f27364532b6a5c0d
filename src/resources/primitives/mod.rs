pub mod cylinder;

pub use cylinder::{CylinderOptions, create_cylinder};
