use crate::eye_pipeline::channels::{ColorOrder, check_color};
use crate::eye_pipeline::common::error::Result;
use crate::eye_pipeline::raster::Raster;

// ITU-R BT.601 luma weights in 14-bit fixed point.
const R2Y: u32 = 4899;
const G2Y: u32 = 9617;
const B2Y: u32 = 1868;
const GRAY_SHIFT: u32 = 14;

/// Collapses a color raster to a single luma plane, the input the external
/// face and eye detectors expect.
pub fn to_grayscale(color: &Raster, order: ColorOrder) -> Result<Raster> {
    check_color(color)?;

    let data = color
        .data
        .chunks_exact(3)
        .map(|px| {
            let (r, g, b) = order.rgb(px);
            let y = r as u32 * R2Y + g as u32 * G2Y + b as u32 * B2Y + (1 << (GRAY_SHIFT - 1));
            (y >> GRAY_SHIFT) as u8
        })
        .collect();

    Ok(Raster {
        width: color.width,
        height: color.height,
        channels: 1,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_map_to_extremes() {
        let color = Raster::new(2, 1, 3, vec![0, 0, 0, 255, 255, 255]).unwrap();
        let gray = to_grayscale(&color, ColorOrder::Rgb).unwrap();
        assert_eq!(gray.data, vec![0, 255]);
    }

    #[test]
    fn green_weighs_most() {
        let color = Raster::new(3, 1, 3, vec![255, 0, 0, 0, 255, 0, 0, 0, 255]).unwrap();
        let gray = to_grayscale(&color, ColorOrder::Rgb).unwrap();
        assert_eq!(gray.data, vec![76, 150, 29]);
    }
}
