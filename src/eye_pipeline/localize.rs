use tracing::{debug, info, instrument};

use crate::eye_pipeline::{
    centroid::{CentroidEstimator, WeightMode},
    channels::{ChannelExtractor, ColorOrder, HsvChannel},
    common::error::Result,
    config::ThresholdConfig,
    crop::RegionCropper,
    mask::{MaskBuilder, MaskStep},
    morphology::{MorphologicalRefiner, RefineStep},
    observer::{Feature, NoopObserver, Stage, StageObserver},
    raster::{Point, Raster},
    timing::{PipelineTimings, Timer},
};

/// Sclera and pupil centers in the coordinate space of the uncropped eye ROI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeFeatureResult {
    pub sclera_center: Point,
    pub pupil_center: Point,
}

impl EyeFeatureResult {
    /// Shifts both points, e.g. from ROI space into frame space.
    pub fn translate(self, dx: i64, dy: i64) -> Self {
        Self {
            sclera_center: self.sclera_center.translate(dx, dy),
            pupil_center: self.pupil_center.translate(dx, dy),
        }
    }
}

/// Localizes the sclera and pupil of a single eye ROI.
///
/// The hue plane feeds the sclera branch (direct weighting) and the value plane
/// feeds the pupil branch (inverted weighting). Both branches crop, threshold,
/// open and take the centroid independently, each with its own config.
/// The sclera branch can read the saturation plane instead, see
/// [`EyeFeaturePipeline::with_sclera_channel`].
pub struct EyeFeaturePipeline<O: StageObserver = NoopObserver> {
    extractor: ChannelExtractor,
    observer: O,
    sclera_channel: HsvChannel,
    sclera: ThresholdConfig,
    pupil: ThresholdConfig,
}

impl EyeFeaturePipeline<NoopObserver> {
    pub fn new(sclera: ThresholdConfig, pupil: ThresholdConfig) -> Self {
        Self {
            extractor: ChannelExtractor::default(),
            observer: NoopObserver,
            sclera_channel: HsvChannel::Hue,
            sclera,
            pupil,
        }
    }
}

impl Default for EyeFeaturePipeline<NoopObserver> {
    fn default() -> Self {
        Self::new(ThresholdConfig::sclera(), ThresholdConfig::pupil())
    }
}

impl<O: StageObserver> EyeFeaturePipeline<O> {
    pub fn with_observer(observer: O, sclera: ThresholdConfig, pupil: ThresholdConfig) -> Self {
        Self {
            extractor: ChannelExtractor::default(),
            observer,
            sclera_channel: HsvChannel::Hue,
            sclera,
            pupil,
        }
    }

    pub fn with_color_order(mut self, order: ColorOrder) -> Self {
        self.extractor = ChannelExtractor::new(order);
        self
    }

    pub fn color_order(&self) -> ColorOrder {
        self.extractor.order()
    }

    /// Plane thresholded for the sclera. Hue by default; saturation suits
    /// lighting where the sclera's hue is unstable.
    pub fn with_sclera_channel(mut self, channel: HsvChannel) -> Self {
        self.sclera_channel = channel;
        self
    }

    #[instrument(skip_all, fields(width = eye_roi.width, height = eye_roi.height))]
    pub fn localize(&self, eye_roi: &Raster) -> Result<EyeFeatureResult> {
        let mut timings = PipelineTimings::new();
        self.run(eye_roi, &mut timings)
    }

    #[instrument(skip_all, fields(width = eye_roi.width, height = eye_roi.height))]
    pub fn localize_with_timings(&self, eye_roi: &Raster) -> Result<(EyeFeatureResult, PipelineTimings)> {
        let mut timings = PipelineTimings::new();
        let result = self.run(eye_roi, &mut timings)?;
        Ok((result, timings))
    }

    fn run(&self, eye_roi: &Raster, timings: &mut PipelineTimings) -> Result<EyeFeatureResult> {
        self.sclera.validate()?;
        self.pupil.validate()?;

        self.observer.on_stage_complete(Stage::Source, eye_roi);

        let planes = {
            let _span = tracing::info_span!("split_hsv").entered();
            let timer = Timer::start("split_hsv");
            let planes = self.extractor.split(eye_roi)?;
            timings.record(timer);
            planes
        };
        self.observer.on_stage_complete(Stage::Hue, &planes.hue);
        self.observer.on_stage_complete(Stage::Saturation, &planes.saturation);
        self.observer.on_stage_complete(Stage::Value, &planes.value);

        let sclera_plane = planes.plane(self.sclera_channel);
        let sclera_center = self.locate(Feature::Sclera, sclera_plane, &self.sclera, WeightMode::Direct, timings)?;
        let pupil_center = self.locate(Feature::Pupil, &planes.value, &self.pupil, WeightMode::Inverted, timings)?;

        info!(
            sclera_x = sclera_center.x,
            sclera_y = sclera_center.y,
            pupil_x = pupil_center.x,
            pupil_y = pupil_center.y,
            "Eye features localized"
        );

        Ok(EyeFeatureResult {
            sclera_center,
            pupil_center,
        })
    }

    /// One feature branch; the returned point is in uncropped ROI coordinates.
    fn locate(
        &self,
        feature: Feature,
        plane: &Raster,
        config: &ThresholdConfig,
        mode: WeightMode,
        timings: &mut PipelineTimings,
    ) -> Result<Point> {
        let _span = tracing::info_span!("locate", feature = %feature).entered();

        let timer = Timer::start(format!("{}_crop", feature));
        let (cropped, top_offset) =
            RegionCropper.crop(plane, config.crop_top_percent, config.crop_bottom_percent)?;
        timings.record(timer);
        self.observer.on_stage_complete(Stage::Cropped(feature), &cropped);

        let timer = Timer::start(format!("{}_mask", feature));
        let mask = MaskBuilder.build_mask_with(&cropped, config, |step, raster| {
            let stage = match step {
                MaskStep::Equalized => Stage::Equalized(feature),
                MaskStep::Thresholded => Stage::Thresholded(feature),
            };
            self.observer.on_stage_complete(stage, raster);
        })?;
        timings.record(timer);

        let timer = Timer::start(format!("{}_morphology", feature));
        let refined = MorphologicalRefiner.refine_with(&mask, config, |step, raster| {
            let stage = match step {
                RefineStep::Eroded => Stage::Eroded(feature),
                RefineStep::Dilated => Stage::Dilated(feature),
            };
            self.observer.on_stage_complete(stage, raster);
        })?;
        timings.record(timer);

        let timer = Timer::start(format!("{}_centroid", feature));
        let centroid = CentroidEstimator.estimate(&refined, mode).inspect_err(|e| {
            debug!(feature = %feature, "Centroid estimation failed: {}", e);
        })?;
        timings.record(timer);

        Ok(centroid.as_point().translate(0, top_offset as i64))
    }
}

/// Localizes one eye ROI with the given configs and no observer.
pub fn localize(eye_roi: &Raster, sclera: &ThresholdConfig, pupil: &ThresholdConfig) -> Result<EyeFeatureResult> {
    EyeFeaturePipeline::new(sclera.clone(), pupil.clone()).localize(eye_roi)
}
