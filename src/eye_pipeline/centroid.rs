//! Intensity-weighted centroid ("center of mass") of a single-channel raster.

use tracing::debug;

use crate::eye_pipeline::common::error::{LocalizationError, Result};
use crate::eye_pipeline::mask::check_plane;
use crate::eye_pipeline::raster::{Point, Raster};

/// How a pixel value turns into a weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightMode {
    /// `w = v`; bright pixels carry the feature (sclera)
    Direct,
    /// `w = 255 - v`; dark pixels carry the feature (pupil)
    Inverted,
}

impl WeightMode {
    #[inline]
    fn weight(self, v: u8) -> u64 {
        match self {
            WeightMode::Direct => u64::from(v),
            WeightMode::Inverted => u64::from(255 - v),
        }
    }
}

/// Centroid position with the total weight it was computed from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    /// Column coordinate, already rounded to the nearest pixel
    pub x: f64,
    /// Row coordinate, already rounded to the nearest pixel
    pub y: f64,
    /// Sum of all weights; never zero for a centroid returned by the estimator
    pub total_weight: u64,
}

impl Centroid {
    pub fn as_point(&self) -> Point {
        Point::new(self.x as i64, self.y as i64)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidEstimator;

impl CentroidEstimator {
    /// Fails with [`LocalizationError::DegenerateMask`] when every pixel has zero weight.
    pub fn estimate(&self, mask: &Raster, mode: WeightMode) -> Result<Centroid> {
        check_plane(mask)?;

        // 64-bit sums cover 4096 x 4096 x 255 with room to spare.
        let mut x_sum = 0u64;
        let mut y_sum = 0u64;
        let mut weight_sum = 0u64;

        for (i, row) in mask.data.chunks_exact(mask.width).enumerate() {
            let mut row_weight = 0u64;
            for (j, &v) in row.iter().enumerate() {
                let w = mode.weight(v);
                x_sum += j as u64 * w;
                row_weight += w;
            }
            y_sum += i as u64 * row_weight;
            weight_sum += row_weight;
        }

        if weight_sum == 0 {
            return Err(LocalizationError::DegenerateMask);
        }

        let centroid = Centroid {
            x: (x_sum as f64 / weight_sum as f64).round(),
            y: (y_sum as f64 / weight_sum as f64).round(),
            total_weight: weight_sum,
        };
        debug!(x = centroid.x, y = centroid.y, weight = weight_sum, ?mode, "Estimated centroid");
        Ok(centroid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_square(w: usize, h: usize, cx: usize, cy: usize, half: usize) -> Raster {
        Raster::from_fn(w, h, |x, y| {
            if x + half >= cx && x <= cx + half && y + half >= cy && y <= cy + half { 255 } else { 0 }
        })
    }

    #[test]
    fn square_centroid_is_its_center() {
        for (cx, cy, half) in [(5, 5, 2), (3, 7, 1), (10, 4, 3), (8, 8, 0)] {
            let mask = filled_square(16, 12, cx, cy, half);
            let c = CentroidEstimator.estimate(&mask, WeightMode::Direct).unwrap();
            assert_eq!(c.as_point(), Point::new(cx as i64, cy as i64));
            let side = (2 * half + 1) as u64;
            assert_eq!(c.total_weight, side * side * 255);
        }
    }

    #[test]
    fn inverted_equals_direct_on_complement() {
        let mask = Raster::from_fn(9, 7, |x, y| if (x * 3 + y) % 5 == 0 { 255 } else { 0 });
        let inverted = CentroidEstimator.estimate(&mask, WeightMode::Inverted).unwrap();
        let direct = CentroidEstimator
            .estimate(&mask.complement(), WeightMode::Direct)
            .unwrap();
        assert_eq!(inverted, direct);
    }

    #[test]
    fn all_zero_mask_is_degenerate() {
        let mask = Raster::filled(8, 8, 1, 0);
        let result = CentroidEstimator.estimate(&mask, WeightMode::Direct);
        assert!(matches!(result, Err(LocalizationError::DegenerateMask)));
    }

    #[test]
    fn all_foreground_is_degenerate_when_inverted() {
        let mask = Raster::filled(8, 8, 1, 255);
        let result = CentroidEstimator.estimate(&mask, WeightMode::Inverted);
        assert!(matches!(result, Err(LocalizationError::DegenerateMask)));
    }

    #[test]
    fn symmetric_blobs_balance_at_center() {
        let mask = Raster::from_fn(9, 9, |x, y| {
            let left = (1..=2).contains(&x) && (3..=5).contains(&y);
            let right = (6..=7).contains(&x) && (3..=5).contains(&y);
            if left || right { 200 } else { 0 }
        });
        let c = CentroidEstimator.estimate(&mask, WeightMode::Direct).unwrap();
        assert_eq!(c.as_point(), Point::new(4, 4));
    }

    #[test]
    fn weights_follow_intensity() {
        // Single row: weight 100 at x=0 and 255 at x=4.
        let mask = Raster::from_fn(5, 1, |x, _| match x {
            0 => 100,
            4 => 255,
            _ => 0,
        });
        let c = CentroidEstimator.estimate(&mask, WeightMode::Direct).unwrap();
        // 4 * 255 / 355 = 2.87
        assert_eq!(c.x, 3.0);
        assert_eq!(c.y, 0.0);
        assert_eq!(c.total_weight, 355);
    }

    #[test]
    fn large_mask_does_not_overflow() {
        let mask = Raster::filled(4096, 4096, 1, 255);
        let c = CentroidEstimator.estimate(&mask, WeightMode::Direct).unwrap();
        assert_eq!(c.total_weight, 4096 * 4096 * 255);
        assert_eq!(c.as_point(), Point::new(2048, 2048));
    }
}
