use std::io::Write;
use tracing::debug;
use crate::eye_pipeline::common::error::{LocalizationError, Result};
use crate::eye_pipeline::raster::Raster;
use crate::eye_pipeline::tiff::writer::TiffWriter;

/// Uncompressed 8-bit Gray or RGB TIFF encoder.
pub struct StandardTiffWriter;

impl TiffWriter for StandardTiffWriter {
    fn write_tiff(&self, raster: &Raster, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding TIFF image: {}x{}x{}", raster.width, raster.height, raster.channels);

        if !raster.is_well_formed() {
            return Err(LocalizationError::InvalidInput(format!(
                "cannot encode malformed {}x{} raster",
                raster.width, raster.height
            )));
        }

        let mut buffer = Vec::new();

        {
            let mut encoder = tiff::encoder::TiffEncoder::new(std::io::Cursor::new(&mut buffer))
                .map_err(|e| LocalizationError::EncodeError(e.to_string()))?;

            let (width, height) = (raster.width as u32, raster.height as u32);
            let written = match raster.channels {
                1 => encoder.write_image::<tiff::encoder::colortype::Gray8>(width, height, &raster.data),
                3 => encoder.write_image::<tiff::encoder::colortype::RGB8>(width, height, &raster.data),
                n => {
                    return Err(LocalizationError::EncodeError(format!(
                        "unsupported channel count {}",
                        n
                    )));
                }
            };
            written.map_err(|e| LocalizationError::EncodeError(e.to_string()))?;
        }

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete");
        Ok(())
    }
}
