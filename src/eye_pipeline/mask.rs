//! Binary mask construction: optional equalization followed by a fixed threshold.

mod equalize;

pub use equalize::equalize_histogram;

use tracing::debug;

use crate::eye_pipeline::common::error::{LocalizationError, Result};
use crate::eye_pipeline::config::ThresholdConfig;
use crate::eye_pipeline::raster::Raster;

/// Intermediate produced while building a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskStep {
    Equalized,
    Thresholded,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaskBuilder;

impl MaskBuilder {
    /// Produces a mask with values in `{0, max_value}`.
    pub fn build_mask(&self, plane: &Raster, config: &ThresholdConfig) -> Result<Raster> {
        self.build_mask_with(plane, config, |_, _| {})
    }

    /// Like [`build_mask`](Self::build_mask), reporting each intermediate to `on_step`.
    pub fn build_mask_with<F>(&self, plane: &Raster, config: &ThresholdConfig, mut on_step: F) -> Result<Raster>
    where
        F: FnMut(MaskStep, &Raster),
    {
        check_plane(plane)?;

        let mut mask = if config.histogram_equalization_enabled {
            let equalized = equalize_histogram(plane)?;
            on_step(MaskStep::Equalized, &equalized);
            equalized
        } else {
            plane.clone()
        };

        apply_threshold(&mut mask, config);
        debug!(
            threshold = config.threshold_value,
            inverted = config.invert_polarity,
            foreground = mask.count_nonzero(),
            total = mask.data.len(),
            "Thresholded plane"
        );
        on_step(MaskStep::Thresholded, &mask);

        Ok(mask)
    }
}

/// `p > t` (or `p <= t` when inverted) becomes `max_value`, everything else 0.
pub fn apply_threshold(plane: &mut Raster, config: &ThresholdConfig) {
    let t = config.threshold_value;
    let max = config.max_value;
    let invert = config.invert_polarity;
    for p in plane.data.iter_mut() {
        let foreground = (*p > t) != invert;
        *p = if foreground { max } else { 0 };
    }
}

pub(crate) fn check_plane(plane: &Raster) -> Result<()> {
    if plane.channels != 1 {
        return Err(LocalizationError::InvalidInput(format!(
            "expected a single-channel plane, got {} channels",
            plane.channels
        )));
    }
    if !plane.is_well_formed() {
        return Err(LocalizationError::InvalidInput(format!(
            "malformed {}x{} plane with {} samples",
            plane.width,
            plane.height,
            plane.data.len()
        )));
    }
    Ok(())
}
