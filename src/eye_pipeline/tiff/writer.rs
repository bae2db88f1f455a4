use std::io::Write;
use crate::eye_pipeline::common::error::Result;
use crate::eye_pipeline::raster::Raster;

pub trait TiffWriter {
    fn write_tiff(&self, raster: &Raster, output: &mut dyn Write) -> Result<()>;
}
