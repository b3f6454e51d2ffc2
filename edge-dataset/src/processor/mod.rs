//! Sample preprocessing building blocks.

pub mod geometry;
pub mod image_io;
pub mod transform;

pub use geometry::*;
pub use image_io::*;
pub use transform::*;
