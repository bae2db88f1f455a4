//! Frame-level driver: faces, then eyes within faces, then eye features.
//!
//! Face and eye detection are external capabilities handed in as
//! [`RegionDetector`] handles; this module only crops, filters and fans out.

use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::eye_pipeline::{
    channels::to_grayscale,
    common::error::{LocalizationError, Result},
    localize::{EyeFeaturePipeline, EyeFeatureResult},
    mask::equalize_histogram,
    observer::{NoopObserver, StageObserver},
    raster::{Raster, Rect},
};

/// Read-only detector capability, e.g. a cascade classifier.
///
/// Receives an equalized grayscale raster and returns rectangles in that
/// raster's coordinates.
pub trait RegionDetector: Sync {
    fn detect(&self, gray: &Raster) -> Result<Vec<Rect>>;
}

impl<F> RegionDetector for F
where
    F: Fn(&Raster) -> Result<Vec<Rect>> + Sync,
{
    fn detect(&self, gray: &Raster) -> Result<Vec<Rect>> {
        self(gray)
    }
}

/// Outcome for one eye, with every coordinate in frame space
#[derive(Debug)]
pub struct EyeReport {
    pub eye_rect: Rect,
    pub outcome: Result<EyeFeatureResult>,
}

impl EyeReport {
    pub fn is_located(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[derive(Debug)]
pub struct FaceReport {
    pub face_rect: Rect,
    pub eyes: Vec<EyeReport>,
}

#[derive(Debug, Default)]
pub struct FrameReport {
    pub faces: Vec<FaceReport>,
}

impl FrameReport {
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn eye_count(&self) -> usize {
        self.faces.iter().map(|f| f.eyes.len()).sum()
    }

    /// Eyes whose features were localized successfully.
    pub fn located_count(&self) -> usize {
        self.faces
            .iter()
            .flat_map(|f| f.eyes.iter())
            .filter(|e| e.is_located())
            .count()
    }
}

/// Eyes detected in the lower half of a face are nostrils or mouth corners.
pub fn is_upper_half_eye(face_height: usize, eye: &Rect) -> bool {
    eye.y
        .checked_add(eye.height / 2)
        .is_some_and(|center| center <= face_height / 2)
}

pub struct FaceProcessor<O: StageObserver = NoopObserver> {
    pipeline: EyeFeaturePipeline<O>,
}

impl<O: StageObserver> FaceProcessor<O> {
    pub fn new(pipeline: EyeFeaturePipeline<O>) -> Self {
        Self { pipeline }
    }

    /// Detects faces and eyes in a color frame and localizes every eye.
    ///
    /// Detector failures abort the frame; per-eye localization failures are
    /// recorded in the report and never affect the other eyes.
    #[instrument(skip_all, fields(width = frame.width, height = frame.height))]
    pub fn process_frame(
        &self,
        frame: &Raster,
        face_detector: &dyn RegionDetector,
        eye_detector: &dyn RegionDetector,
    ) -> Result<FrameReport> {
        let gray = {
            let _span = tracing::info_span!("prepare_gray").entered();
            equalize_histogram(&to_grayscale(frame, self.pipeline.color_order())?)?
        };

        let face_rects = {
            let _span = tracing::info_span!("detect_faces").entered();
            face_detector.detect(&gray)?
        };

        let mut faces = Vec::with_capacity(face_rects.len());
        let mut candidates = Vec::new();

        for (face_index, face_rect) in face_rects.into_iter().enumerate() {
            if !face_rect.fits_within(frame.width, frame.height) || face_rect.is_empty() {
                warn!(?face_rect, "Face rectangle outside frame, skipping");
                continue;
            }

            let face_gray = gray.sub_rect(face_rect)?;
            let eye_rects = {
                let _span = tracing::info_span!("detect_eyes", face = face_index).entered();
                eye_detector.detect(&face_gray)?
            };

            for eye in eye_rects {
                if !is_upper_half_eye(face_rect.height, &eye) {
                    continue;
                }
                match face_rect.offset_into(eye) {
                    Some(eye_rect) => candidates.push((faces.len(), eye_rect)),
                    None => warn!(?face_rect, ?eye, "Eye rectangle overflows frame space, skipping"),
                }
            }

            faces.push(FaceReport {
                face_rect,
                eyes: Vec::new(),
            });
        }

        let reports: Vec<(usize, EyeReport)> = candidates
            .par_iter()
            .map(|&(face_slot, eye_rect)| {
                let outcome = self.localize_eye(frame, eye_rect);
                if let Err(e) = &outcome {
                    warn!(?eye_rect, "Eye localization failed: {}", e);
                }
                (face_slot, EyeReport { eye_rect, outcome })
            })
            .collect();

        for (face_slot, report) in reports {
            faces[face_slot].eyes.push(report);
        }

        let report = FrameReport { faces };
        info!(
            "Faces/Eyes/Pupils : {}/{}/{}",
            report.face_count(),
            report.eye_count(),
            report.located_count()
        );
        Ok(report)
    }

    fn localize_eye(&self, frame: &Raster, eye_rect: Rect) -> Result<EyeFeatureResult> {
        if !eye_rect.fits_within(frame.width, frame.height) {
            return Err(LocalizationError::InvalidInput(format!(
                "eye rect {:?} outside {}x{} frame",
                eye_rect, frame.width, frame.height
            )));
        }
        let roi = frame.sub_rect(eye_rect)?;
        let result = self.pipeline.localize(&roi)?;
        Ok(result.translate(eye_rect.x as i64, eye_rect.y as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_half_filter() {
        // Face 100 rows high: centers at or above row 50 pass.
        assert!(is_upper_half_eye(100, &Rect::new(10, 20, 30, 20)));
        assert!(is_upper_half_eye(100, &Rect::new(10, 40, 30, 20)));
        assert!(!is_upper_half_eye(100, &Rect::new(10, 45, 30, 20)));
        assert!(!is_upper_half_eye(100, &Rect::new(0, usize::MAX, 2, 4)));
    }

    fn skin_frame() -> Raster {
        Raster::filled(16, 16, 3, 120)
    }

    #[test]
    fn oversized_face_rect_is_skipped() {
        let processor = FaceProcessor::new(EyeFeaturePipeline::default());
        let faces = |_: &Raster| -> Result<Vec<Rect>> { Ok(vec![Rect::new(usize::MAX, 0, 2, 2)]) };
        let eyes = |_: &Raster| -> Result<Vec<Rect>> { Ok(vec![Rect::new(0, 0, 2, 2)]) };

        let report = processor.process_frame(&skin_frame(), &faces, &eyes).unwrap();
        assert_eq!(report.face_count(), 0);
    }

    #[test]
    fn oversized_eye_rects_do_not_abort_frame() {
        let processor = FaceProcessor::new(EyeFeaturePipeline::default());
        let faces = |_: &Raster| -> Result<Vec<Rect>> { Ok(vec![Rect::new(1, 0, 15, 16)]) };
        let eyes = |_: &Raster| -> Result<Vec<Rect>> {
            Ok(vec![
                // Origin overflows once shifted by the face.
                Rect::new(usize::MAX, 0, 2, 2),
                // Origin is fine, right edge overflows.
                Rect::new(0, 0, usize::MAX, 2),
            ])
        };

        let report = processor.process_frame(&skin_frame(), &faces, &eyes).unwrap();
        assert_eq!(report.face_count(), 1);
        assert_eq!(report.eye_count(), 1);
        assert_eq!(report.located_count(), 0);
        assert!(matches!(
            report.faces[0].eyes[0].outcome,
            Err(LocalizationError::InvalidInput(_))
        ));
    }

    #[test]
    fn frame_report_counts() {
        let ok = EyeFeatureResult {
            sclera_center: Default::default(),
            pupil_center: Default::default(),
        };
        let report = FrameReport {
            faces: vec![FaceReport {
                face_rect: Rect::new(0, 0, 10, 10),
                eyes: vec![
                    EyeReport { eye_rect: Rect::new(0, 0, 2, 2), outcome: Ok(ok) },
                    EyeReport {
                        eye_rect: Rect::new(5, 0, 2, 2),
                        outcome: Err(LocalizationError::DegenerateMask),
                    },
                ],
            }],
        };
        assert_eq!(report.face_count(), 1);
        assert_eq!(report.eye_count(), 2);
        assert_eq!(report.located_count(), 1);
    }
}
