//! Per-feature threshold configuration

use crate::eye_pipeline::common::error::{LocalizationError, Result};

/// Thresholding, morphology and crop settings for one feature (sclera or pupil).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdConfig {
    /// Cut point separating foreground from background
    pub threshold_value: u8,
    /// Value written for foreground pixels
    pub max_value: u8,
    /// Foreground is `p <= threshold` instead of `p > threshold`.
    ///
    /// The pupil branch always weights its mask inverted, so a pupil config
    /// must keep normal polarity for the dark pupil to carry the weight.
    pub invert_polarity: bool,
    /// Equalize the plane's histogram before thresholding
    pub histogram_equalization_enabled: bool,
    pub erosion_enabled: bool,
    pub erosion_iterations: u32,
    pub dilation_enabled: bool,
    pub dilation_iterations: u32,
    /// Share of rows removed from the top (brow and lashes), in percent
    pub crop_top_percent: u8,
    /// Share of rows removed from the bottom, in percent
    pub crop_bottom_percent: u8,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            threshold_value: 127,
            max_value: 255,
            invert_polarity: false,
            histogram_equalization_enabled: false,
            erosion_enabled: false,
            erosion_iterations: 0,
            dilation_enabled: false,
            dilation_iterations: 0,
            crop_top_percent: 0,
            crop_bottom_percent: 0,
        }
    }
}

impl ThresholdConfig {
    pub fn builder() -> ThresholdConfigBuilder {
        ThresholdConfigBuilder::default()
    }

    /// Hue-channel preset tuned for the sclera.
    pub fn sclera() -> Self {
        Self::builder()
            .threshold_value(30)
            .erosion(1)
            .dilation(8)
            .crop_top_percent(40)
            .build()
    }

    /// Value-channel preset tuned for the pupil. Dark pupil pixels fall below the
    /// threshold, so the mask marks "not pupil" and is weighted inverted downstream.
    pub fn pupil() -> Self {
        Self::builder()
            .threshold_value(10)
            .histogram_equalization(true)
            .erosion(2)
            .dilation(4)
            .crop_top_percent(40)
            .build()
    }

    /// Rejects out-of-range percentages. Bands that overlap once applied to a
    /// plane are reported by the cropper as `InvalidRegion`.
    pub fn validate(&self) -> Result<()> {
        if self.crop_top_percent > 100 || self.crop_bottom_percent > 100 {
            return Err(LocalizationError::InvalidConfig(format!(
                "crop percentages must be within 0..=100, got top={} bottom={}",
                self.crop_top_percent, self.crop_bottom_percent
            )));
        }
        Ok(())
    }

    /// Erosion passes that will actually run.
    pub fn effective_erosion(&self) -> u32 {
        if self.erosion_enabled { self.erosion_iterations } else { 0 }
    }

    /// Dilation passes that will actually run.
    pub fn effective_dilation(&self) -> u32 {
        if self.dilation_enabled { self.dilation_iterations } else { 0 }
    }
}

/// Builder for ThresholdConfig
#[derive(Default)]
pub struct ThresholdConfigBuilder {
    threshold_value: Option<u8>,
    max_value: Option<u8>,
    invert_polarity: Option<bool>,
    histogram_equalization_enabled: Option<bool>,
    erosion_iterations: Option<Option<u32>>,
    dilation_iterations: Option<Option<u32>>,
    crop_top_percent: Option<u8>,
    crop_bottom_percent: Option<u8>,
}

impl ThresholdConfigBuilder {
    pub fn threshold_value(mut self, value: u8) -> Self {
        self.threshold_value = Some(value);
        self
    }

    pub fn max_value(mut self, value: u8) -> Self {
        self.max_value = Some(value);
        self
    }

    pub fn invert_polarity(mut self, invert: bool) -> Self {
        self.invert_polarity = Some(invert);
        self
    }

    pub fn histogram_equalization(mut self, enable: bool) -> Self {
        self.histogram_equalization_enabled = Some(enable);
        self
    }

    /// Enables erosion with the given pass count.
    pub fn erosion(mut self, iterations: u32) -> Self {
        self.erosion_iterations = Some(Some(iterations));
        self
    }

    pub fn no_erosion(mut self) -> Self {
        self.erosion_iterations = Some(None);
        self
    }

    /// Enables dilation with the given pass count.
    pub fn dilation(mut self, iterations: u32) -> Self {
        self.dilation_iterations = Some(Some(iterations));
        self
    }

    pub fn no_dilation(mut self) -> Self {
        self.dilation_iterations = Some(None);
        self
    }

    pub fn crop_top_percent(mut self, percent: u8) -> Self {
        self.crop_top_percent = Some(percent);
        self
    }

    pub fn crop_bottom_percent(mut self, percent: u8) -> Self {
        self.crop_bottom_percent = Some(percent);
        self
    }

    pub fn build(self) -> ThresholdConfig {
        let default = ThresholdConfig::default();
        let erosion = self
            .erosion_iterations
            .unwrap_or(default.erosion_enabled.then_some(default.erosion_iterations));
        let dilation = self
            .dilation_iterations
            .unwrap_or(default.dilation_enabled.then_some(default.dilation_iterations));
        ThresholdConfig {
            threshold_value: self.threshold_value.unwrap_or(default.threshold_value),
            max_value: self.max_value.unwrap_or(default.max_value),
            invert_polarity: self.invert_polarity.unwrap_or(default.invert_polarity),
            histogram_equalization_enabled: self
                .histogram_equalization_enabled
                .unwrap_or(default.histogram_equalization_enabled),
            erosion_enabled: erosion.is_some(),
            erosion_iterations: erosion.unwrap_or(0),
            dilation_enabled: dilation.is_some(),
            dilation_iterations: dilation.unwrap_or(0),
            crop_top_percent: self.crop_top_percent.unwrap_or(default.crop_top_percent),
            crop_bottom_percent: self.crop_bottom_percent.unwrap_or(default.crop_bottom_percent),
        }
    }
}
