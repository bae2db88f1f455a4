//! TIFF module
//!
//! Loads eye ROIs from 8-bit TIFF files and writes stage rasters back out.

mod reader;
mod standard_tiff_writer;
mod writer;

pub use reader::{decode_tiff, read_tiff};
pub use standard_tiff_writer::StandardTiffWriter;
pub use writer::TiffWriter;
