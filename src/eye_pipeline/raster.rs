//! Raster and geometry types shared by every pipeline stage.

pub mod types;

pub use types::{Point, Raster, Rect};
