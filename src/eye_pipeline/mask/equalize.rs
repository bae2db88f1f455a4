use crate::eye_pipeline::common::error::Result;
use crate::eye_pipeline::mask::check_plane;
use crate::eye_pipeline::raster::Raster;

const LEVELS: usize = 256;

/// Global histogram equalization of a single-channel plane.
///
/// The lowest occupied level maps to 0 and the cumulative histogram of the
/// remaining pixels is stretched over `1..=255`. A constant plane is returned
/// unchanged.
pub fn equalize_histogram(plane: &Raster) -> Result<Raster> {
    check_plane(plane)?;

    let mut hist = [0u32; LEVELS];
    for &p in &plane.data {
        hist[p as usize] += 1;
    }

    let total = plane.data.len() as u32;
    let first = hist.iter().position(|&count| count != 0).unwrap_or(0);
    if hist[first] == total {
        return Ok(plane.clone());
    }

    let scale = (LEVELS - 1) as f32 / (total - hist[first]) as f32;
    let mut lut = [0u8; LEVELS];
    let mut sum = 0u32;
    for level in first + 1..LEVELS {
        sum += hist[level];
        lut[level] = (sum as f32 * scale).round_ties_even().clamp(0.0, 255.0) as u8;
    }

    let mut out = plane.clone();
    for p in out.data.iter_mut() {
        *p = lut[*p as usize];
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_levels_stretch_to_full_range() {
        let plane = Raster::from_fn(2, 2, |x, _| if x == 0 { 40 } else { 41 });
        let out = equalize_histogram(&plane).unwrap();
        assert_eq!(out.data, vec![0, 255, 0, 255]);
    }

    #[test]
    fn constant_plane_is_unchanged() {
        let plane = Raster::filled(3, 3, 1, 77);
        assert_eq!(equalize_histogram(&plane).unwrap(), plane);
    }

    #[test]
    fn output_is_monotonic() {
        let plane = Raster::from_fn(16, 16, |x, y| ((x * y) % 97) as u8);
        let out = equalize_histogram(&plane).unwrap();
        let mut pairs: Vec<(u8, u8)> = plane.data.iter().copied().zip(out.data.iter().copied()).collect();
        pairs.sort();
        for w in pairs.windows(2) {
            assert!(w[0].1 <= w[1].1);
        }
        assert_eq!(*out.data.iter().max().unwrap(), 255);
        assert_eq!(*out.data.iter().min().unwrap(), 0);
    }

    #[test]
    fn keeps_geometry() {
        let plane = Raster::from_fn(5, 3, |x, y| (x + 10 * y) as u8);
        let out = equalize_histogram(&plane).unwrap();
        assert_eq!((out.width, out.height, out.channels), (5, 3, 1));
    }
}
