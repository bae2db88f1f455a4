//! Mathematical morphology on binary masks
//!
//! - **Erosion**: 3x3 minimum filter, shrinks foreground and removes specks
//! - **Dilation**: 3x3 maximum filter, regrows the surviving regions
//!
//! Pixels outside the raster never take part in the min/max, so the border
//! neither erodes nor grows foreground on its own.

use tracing::debug;

use crate::eye_pipeline::common::error::Result;
use crate::eye_pipeline::config::ThresholdConfig;
use crate::eye_pipeline::mask::check_plane;
use crate::eye_pipeline::raster::Raster;

/// Intermediate produced while refining a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineStep {
    Eroded,
    Dilated,
}

/// Erode-then-dilate opening with independent pass counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MorphologicalRefiner;

impl MorphologicalRefiner {
    pub fn refine(&self, mask: &Raster, config: &ThresholdConfig) -> Result<Raster> {
        self.refine_with(mask, config, |_, _| {})
    }

    /// Like [`refine`](Self::refine), reporting each pass group that ran to `on_step`.
    pub fn refine_with<F>(&self, mask: &Raster, config: &ThresholdConfig, mut on_step: F) -> Result<Raster>
    where
        F: FnMut(RefineStep, &Raster),
    {
        check_plane(mask)?;

        let mut out = mask.clone();

        let erosions = config.effective_erosion();
        if erosions > 0 {
            out = erode(&out, erosions);
            debug!(iterations = erosions, foreground = out.count_nonzero(), "Eroded mask");
            on_step(RefineStep::Eroded, &out);
        }

        let dilations = config.effective_dilation();
        if dilations > 0 {
            out = dilate(&out, dilations);
            debug!(iterations = dilations, foreground = out.count_nonzero(), "Dilated mask");
            on_step(RefineStep::Dilated, &out);
        }

        Ok(out)
    }
}

/// Applies `iterations` passes of a 3x3 minimum filter.
pub fn erode(plane: &Raster, iterations: u32) -> Raster {
    repeat(plane, iterations, u8::min)
}

/// Applies `iterations` passes of a 3x3 maximum filter.
pub fn dilate(plane: &Raster, iterations: u32) -> Raster {
    repeat(plane, iterations, u8::max)
}

fn repeat(plane: &Raster, iterations: u32, pick: fn(u8, u8) -> u8) -> Raster {
    let mut out = plane.clone();
    let mut scratch = vec![0u8; plane.data.len()];
    for _ in 0..iterations {
        filter_3x3(&mut out, &mut scratch, pick);
    }
    out
}

// The 3x3 rectangle is separable: a horizontal pass into `scratch`, then a
// vertical pass back into `plane`.
fn filter_3x3(plane: &mut Raster, scratch: &mut [u8], pick: fn(u8, u8) -> u8) {
    let (w, h) = (plane.width, plane.height);
    let data = &mut plane.data;

    for y in 0..h {
        let row = &data[y * w..(y + 1) * w];
        for x in 0..w {
            let mut v = row[x];
            if x > 0 {
                v = pick(v, row[x - 1]);
            }
            if x + 1 < w {
                v = pick(v, row[x + 1]);
            }
            scratch[y * w + x] = v;
        }
    }

    for y in 0..h {
        for x in 0..w {
            let mut v = scratch[y * w + x];
            if y > 0 {
                v = pick(v, scratch[(y - 1) * w + x]);
            }
            if y + 1 < h {
                v = pick(v, scratch[(y + 1) * w + x]);
            }
            data[y * w + x] = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: usize, from: usize, to: usize) -> Raster {
        Raster::from_fn(size, size, |x, y| {
            if (from..=to).contains(&x) && (from..=to).contains(&y) { 255 } else { 0 }
        })
    }

    #[test]
    fn erosion_removes_isolated_speck() {
        let mut mask = square(9, 2, 6);
        mask.set(0, 8, 255);
        let eroded = erode(&mask, 1);

        assert_eq!(eroded.get(0, 8), 0);
        assert_eq!(eroded, square(9, 3, 5));
    }

    #[test]
    fn dilation_grows_by_one_pixel_per_pass() {
        let mask = square(11, 5, 5);
        assert_eq!(dilate(&mask, 1), square(11, 4, 6));
        assert_eq!(dilate(&mask, 3), square(11, 2, 8));
    }

    #[test]
    fn border_does_not_erode_foreground() {
        let full = Raster::filled(4, 4, 1, 255);
        assert_eq!(erode(&full, 2), full);
    }

    #[test]
    fn refine_is_erode_then_dilate() {
        let mut mask = square(12, 3, 7);
        mask.set(11, 0, 255);
        let config = ThresholdConfig::builder().erosion(1).dilation(1).build();

        let mut steps = Vec::new();
        let refined = MorphologicalRefiner
            .refine_with(&mask, &config, |step, _| steps.push(step))
            .unwrap();

        assert_eq!(steps, vec![RefineStep::Eroded, RefineStep::Dilated]);
        // Opening restores the square but not the speck.
        assert_eq!(refined, square(12, 3, 7));
    }

    #[test]
    fn zero_iterations_is_noop() {
        let mask = square(6, 1, 3);
        let config = ThresholdConfig::builder().erosion(0).dilation(0).build();
        assert_eq!(MorphologicalRefiner.refine(&mask, &config).unwrap(), mask);
    }

    #[test]
    fn refine_then_noop_matches_single_refine() {
        let mut mask = square(10, 2, 7);
        mask.set(9, 9, 255);
        let config = ThresholdConfig::builder().erosion(2).dilation(3).build();
        let noop = ThresholdConfig::builder().no_erosion().no_dilation().build();

        let once = MorphologicalRefiner.refine(&mask, &config).unwrap();
        let twice = MorphologicalRefiner
            .refine(&MorphologicalRefiner.refine(&mask, &config).unwrap(), &noop)
            .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn disabled_steps_skip_iterations() {
        let mask = square(6, 1, 3);
        let config = ThresholdConfig {
            erosion_enabled: false,
            erosion_iterations: 3,
            dilation_enabled: false,
            dilation_iterations: 3,
            ..ThresholdConfig::default()
        };
        assert_eq!(MorphologicalRefiner.refine(&mask, &config).unwrap(), mask);
    }
}
