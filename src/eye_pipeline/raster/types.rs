//! Raster and geometry types

use crate::eye_pipeline::common::error::{LocalizationError, Result};

/// An 8-bit raster with interleaved channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    /// Width of the raster in pixels
    pub width: usize,
    /// Height of the raster in pixels
    pub height: usize,
    /// Samples per pixel (1 for planes and masks, 3 for color)
    pub channels: usize,
    /// Row-major pixel data, `channels` samples per pixel
    pub data: Vec<u8>,
}

impl Raster {
    /// Wraps an existing buffer, checking that it matches the declared geometry.
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(LocalizationError::InvalidInput(format!(
                "zero-sized raster {}x{}",
                width, height
            )));
        }
        if channels == 0 {
            return Err(LocalizationError::InvalidInput("raster has no channels".to_string()));
        }
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(LocalizationError::InvalidInput(format!(
                "buffer holds {} samples, {}x{}x{} needs {}",
                data.len(),
                width,
                height,
                channels,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn filled(width: usize, height: usize, channels: usize, value: u8) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![value; width * height * channels],
        }
    }

    /// Builds a single-channel plane from a `(x, y) -> value` function.
    pub fn from_fn<F>(width: usize, height: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> u8,
    {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            channels: 1,
            data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the buffer length agrees with the declared geometry.
    pub fn is_well_formed(&self) -> bool {
        !self.is_empty() && self.channels > 0 && self.data.len() == self.width * self.height * self.channels
    }

    /// First sample of the pixel at `(x, y)`. Panics when out of bounds.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[(y * self.width + x) * self.channels]
    }

    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        let idx = (y * self.width + x) * self.channels;
        self.data[idx] = value;
    }

    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let start = (y * self.width + x) * self.channels;
        &self.data[start..start + self.channels]
    }

    /// Copies the pixels under `rect` into a new raster.
    pub fn sub_rect(&self, rect: Rect) -> Result<Raster> {
        if !rect.fits_within(self.width, self.height) || rect.is_empty() {
            return Err(LocalizationError::InvalidInput(format!(
                "rect {:?} does not fit a {}x{} raster",
                rect, self.width, self.height
            )));
        }

        let stride = self.width * self.channels;
        let span = rect.width * self.channels;
        let mut data = Vec::with_capacity(rect.height * span);
        for y in rect.y..rect.y + rect.height {
            let start = y * stride + rect.x * self.channels;
            data.extend_from_slice(&self.data[start..start + span]);
        }

        Ok(Raster {
            width: rect.width,
            height: rect.height,
            channels: self.channels,
            data,
        })
    }

    /// Pixel-wise `255 - v`.
    pub fn complement(&self) -> Raster {
        Raster {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: self.data.iter().map(|&v| 255 - v).collect(),
        }
    }

    /// Number of non-zero samples.
    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

/// Axis-aligned sub-region of a raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Rects coming from detectors are untrusted; an edge past `usize::MAX`
    /// does not fit anything.
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        right.is_some_and(|r| r <= width) && bottom.is_some_and(|b| b <= height)
    }

    /// Integer center, truncated toward the top-left.
    pub fn center(&self) -> Point {
        Point::new(
            (self.x + self.width / 2) as i64,
            (self.y + self.height / 2) as i64,
        )
    }

    /// Moves a rect expressed relative to `self` into `self`'s parent space.
    /// `None` when the shifted origin overflows.
    pub fn offset_into(&self, inner: Rect) -> Option<Rect> {
        Some(Rect::new(
            self.x.checked_add(inner.x)?,
            self.y.checked_add(inner.y)?,
            inner.width,
            inner.height,
        ))
    }
}

/// Integer pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn translate(self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_mismatched_buffer() {
        let result = Raster::new(4, 4, 3, vec![0u8; 4 * 4]);
        assert!(matches!(result, Err(LocalizationError::InvalidInput(_))));
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        let result = Raster::new(0, 4, 1, Vec::new());
        assert!(matches!(result, Err(LocalizationError::InvalidInput(_))));
    }

    #[test]
    fn sub_rect_copies_expected_pixels() {
        let plane = Raster::from_fn(5, 4, |x, y| (y * 10 + x) as u8);
        let sub = plane.sub_rect(Rect::new(1, 2, 3, 2)).unwrap();

        assert_eq!(sub.width, 3);
        assert_eq!(sub.height, 2);
        assert_eq!(sub.data, vec![21, 22, 23, 31, 32, 33]);
    }

    #[test]
    fn sub_rect_keeps_interleaved_channels() {
        let color = Raster::new(2, 1, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let sub = color.sub_rect(Rect::new(1, 0, 1, 1)).unwrap();
        assert_eq!(sub.pixel(0, 0), &[4, 5, 6]);
    }

    #[test]
    fn sub_rect_out_of_bounds_fails() {
        let plane = Raster::filled(4, 4, 1, 0);
        assert!(plane.sub_rect(Rect::new(2, 2, 3, 1)).is_err());
    }

    #[test]
    fn rect_offset_and_center() {
        let face = Rect::new(100, 50, 80, 80);
        let eye = face.offset_into(Rect::new(10, 20, 30, 16)).unwrap();
        assert_eq!(eye, Rect::new(110, 70, 30, 16));
        assert_eq!(eye.center(), Point::new(125, 78));
    }

    #[test]
    fn huge_rects_never_fit() {
        assert!(!Rect::new(usize::MAX, 0, 2, 2).fits_within(100, 100));
        assert!(!Rect::new(0, 1, 2, usize::MAX).fits_within(100, 100));
        assert!(Rect::new(98, 98, 2, 2).fits_within(100, 100));

        let face = Rect::new(1, 0, 10, 10);
        assert_eq!(face.offset_into(Rect::new(usize::MAX, 0, 2, 2)), None);
    }
}
