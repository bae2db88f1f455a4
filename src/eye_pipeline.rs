//! Eye feature localization pipeline
//!
//! Splits an eye ROI into HSV planes, crops the brow band, thresholds and
//! opens a hue mask (sclera) and a value mask (pupil), and reports the
//! intensity-weighted centroid of each in ROI coordinates.

pub mod centroid;
pub mod channels;
pub mod common;
pub mod config;
pub mod crop;
pub mod face;
pub mod localize;
pub mod mask;
pub mod morphology;
pub mod observer;
pub mod raster;
pub mod tiff;
pub mod timing;


pub use common::{
    LocalizationError,
    Result,
};

pub use raster::{
    Point,
    Raster,
    Rect,
};

pub use channels::{
    ChannelExtractor,
    ColorOrder,
    HsvChannel,
    HsvPlanes,
    to_grayscale,
};

pub use config::{
    ThresholdConfig,
    ThresholdConfigBuilder,
};

pub use crop::RegionCropper;
pub use mask::{MaskBuilder, equalize_histogram};
pub use morphology::MorphologicalRefiner;
pub use centroid::{Centroid, CentroidEstimator, WeightMode};

pub use observer::{
    Feature,
    NoopObserver,
    Stage,
    StageObserver,
    TiffDumpObserver,
};

pub use localize::{
    EyeFeaturePipeline,
    EyeFeatureResult,
    localize,
};

pub use face::{
    EyeReport,
    FaceProcessor,
    FaceReport,
    FrameReport,
    RegionDetector,
};

pub use self::tiff::{
    StandardTiffWriter,
    TiffWriter,
    decode_tiff,
    read_tiff,
};

pub use timing::{PipelineTimings, StepTiming, Timer};
