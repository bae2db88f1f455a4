//! Stage observers
//!
//! Every pipeline stage hands its output raster to a [`StageObserver`] once it
//! is complete. The default observer does nothing; [`TiffDumpObserver`] writes
//! each raster to disk for offline inspection.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::eye_pipeline::common::error::LocalizationError;
use crate::eye_pipeline::raster::Raster;
use crate::eye_pipeline::tiff::{StandardTiffWriter, TiffWriter};

/// Feature branch a stage belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Sclera,
    Pupil,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Sclera => write!(f, "sclera"),
            Feature::Pupil => write!(f, "pupil"),
        }
    }
}

/// A completed pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Source,
    Hue,
    Saturation,
    Value,
    Cropped(Feature),
    Equalized(Feature),
    Thresholded(Feature),
    Eroded(Feature),
    Dilated(Feature),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Source => write!(f, "source"),
            Stage::Hue => write!(f, "hue"),
            Stage::Saturation => write!(f, "saturation"),
            Stage::Value => write!(f, "value"),
            Stage::Cropped(feature) => write!(f, "{}_cropped", feature),
            Stage::Equalized(feature) => write!(f, "{}_equalized", feature),
            Stage::Thresholded(feature) => write!(f, "{}_threshold", feature),
            Stage::Eroded(feature) => write!(f, "{}_erode", feature),
            Stage::Dilated(feature) => write!(f, "{}_dilate", feature),
        }
    }
}

pub trait StageObserver: Send + Sync {
    fn on_stage_complete(&self, stage: Stage, raster: &Raster);
}

impl<O: StageObserver + ?Sized> StageObserver for &O {
    fn on_stage_complete(&self, stage: Stage, raster: &Raster) {
        (**self).on_stage_complete(stage, raster);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {
    #[inline]
    fn on_stage_complete(&self, _stage: Stage, _raster: &Raster) {}
}

/// Writes every stage raster to `<dir>/<prefix>_<stage>.tiff`.
///
/// Write failures are logged and otherwise ignored so a full disk never
/// aborts localization.
pub struct TiffDumpObserver {
    dir: PathBuf,
    prefix: String,
}

impl TiffDumpObserver {
    pub fn new<P: AsRef<Path>>(dir: P, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            prefix: prefix.into(),
        }
    }

    pub fn path_for(&self, stage: Stage) -> PathBuf {
        self.dir.join(format!("{}_{}.tiff", self.prefix, stage))
    }
}

impl StageObserver for TiffDumpObserver {
    fn on_stage_complete(&self, stage: Stage, raster: &Raster) {
        let path = self.path_for(stage);
        let result = std::fs::File::create(&path)
            .map_err(LocalizationError::from)
            .and_then(|mut file| StandardTiffWriter.write_tiff(raster, &mut file));

        match result {
            Ok(()) => debug!(stage = %stage, path = %path.display(), "Dumped stage raster"),
            Err(e) => warn!(stage = %stage, path = %path.display(), "Failed to dump stage raster: {}", e),
        }
    }
}
