//! Sclera and pupil localization inside a cropped eye region.
//!
//! The core entry point is [`eye_pipeline::EyeFeaturePipeline`], which turns a
//! color eye ROI into two centroid estimates. [`eye_pipeline::FaceProcessor`]
//! drives it over whole frames given an external face/eye detector.

pub mod eye_pipeline;
pub mod logger;
