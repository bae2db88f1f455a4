//! Vertical band removal (brow and lash area) ahead of masking.

use tracing::debug;

use crate::eye_pipeline::common::error::{LocalizationError, Result};
use crate::eye_pipeline::mask::check_plane;
use crate::eye_pipeline::raster::{Raster, Rect};

/// Removes a top and bottom band, expressed as percentages of the plane height.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionCropper;

impl RegionCropper {
    /// Rows dropped for `percent` of `height`, rounded to the nearest row.
    pub fn offset_rows(height: usize, percent: u8) -> usize {
        (height as f64 * f64::from(percent) / 100.0).round() as usize
    }

    /// Returns the cropped plane and the number of rows removed from the top,
    /// which callers add back to map cropped coordinates onto the input.
    pub fn crop(&self, plane: &Raster, top_percent: u8, bottom_percent: u8) -> Result<(Raster, usize)> {
        check_plane(plane)?;
        if top_percent > 100 || bottom_percent > 100 {
            return Err(LocalizationError::InvalidConfig(format!(
                "crop percentages must be within 0..=100, got top={} bottom={}",
                top_percent, bottom_percent
            )));
        }

        let height = plane.height;
        let top = Self::offset_rows(height, top_percent);
        let bottom = Self::offset_rows(height, bottom_percent);

        if top + bottom >= height {
            return Err(LocalizationError::InvalidRegion { top, bottom, height });
        }

        let region = Rect::new(0, top, plane.width, height - bottom - top);
        debug!(top, bottom, rows = region.height, "Cropping plane");

        Ok((plane.sub_rect(region)?, top))
    }
}
