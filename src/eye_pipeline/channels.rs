//! Color-space reduction: HSV channel split and grayscale conversion.

mod gray;
mod hsv;

pub use gray::to_grayscale;

use tracing::debug;

use crate::eye_pipeline::common::error::{LocalizationError, Result};
use crate::eye_pipeline::raster::Raster;

/// Channel order of an interleaved 3-channel raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorOrder {
    #[default]
    Rgb,
    Bgr,
}

impl ColorOrder {
    /// Returns `(r, g, b)` from one interleaved pixel.
    #[inline]
    pub(crate) fn rgb(self, pixel: &[u8]) -> (u8, u8, u8) {
        match self {
            ColorOrder::Rgb => (pixel[0], pixel[1], pixel[2]),
            ColorOrder::Bgr => (pixel[2], pixel[1], pixel[0]),
        }
    }
}

/// Hue, saturation and value planes of one color raster
#[derive(Debug, Clone)]
pub struct HsvPlanes {
    /// Hue in half-degrees, `0..=180`
    pub hue: Raster,
    pub saturation: Raster,
    pub value: Raster,
}

/// Selects one plane of [`HsvPlanes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HsvChannel {
    Hue,
    Saturation,
    Value,
}

impl HsvPlanes {
    pub fn plane(&self, channel: HsvChannel) -> &Raster {
        match channel {
            HsvChannel::Hue => &self.hue,
            HsvChannel::Saturation => &self.saturation,
            HsvChannel::Value => &self.value,
        }
    }
}

/// Converts color ROIs to HSV and demultiplexes the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelExtractor {
    order: ColorOrder,
}

impl ChannelExtractor {
    pub fn new(order: ColorOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> ColorOrder {
        self.order
    }

    pub fn split(&self, color: &Raster) -> Result<HsvPlanes> {
        check_color(color)?;

        let pixels = color.width * color.height;
        let mut hue = Vec::with_capacity(pixels);
        let mut saturation = Vec::with_capacity(pixels);
        let mut value = Vec::with_capacity(pixels);

        for px in color.data.chunks_exact(3) {
            let (r, g, b) = self.order.rgb(px);
            let (h, s, v) = hsv::rgb_to_hsv(r, g, b);
            hue.push(h);
            saturation.push(s);
            value.push(v);
        }

        debug!("Split {}x{} ROI into HSV planes", color.width, color.height);

        let plane = |data: Vec<u8>| Raster {
            width: color.width,
            height: color.height,
            channels: 1,
            data,
        };
        Ok(HsvPlanes {
            hue: plane(hue),
            saturation: plane(saturation),
            value: plane(value),
        })
    }
}

pub(crate) fn check_color(color: &Raster) -> Result<()> {
    if color.channels != 3 {
        return Err(LocalizationError::InvalidInput(format!(
            "expected a 3-channel color raster, got {} channel(s)",
            color.channels
        )));
    }
    if !color.is_well_formed() {
        return Err(LocalizationError::InvalidInput(format!(
            "malformed {}x{} color raster with {} samples",
            color.width,
            color.height,
            color.data.len()
        )));
    }
    Ok(())
}
