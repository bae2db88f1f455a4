//! 8-bit RGB to HSV with fixed-point division tables.
//!
//! Hue is stored in half-degrees (`0..=180`) so it fits a byte; saturation and
//! value use the full `0..=255` range.

use std::sync::OnceLock;

const HSV_SHIFT: u32 = 12;
const ROUND: i32 = 1 << (HSV_SHIFT - 1);
const HUE_RANGE: i32 = 180;

struct DivTables {
    sdiv: [i32; 256],
    hdiv: [i32; 256],
}

fn tables() -> &'static DivTables {
    static TABLES: OnceLock<DivTables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let mut sdiv = [0i32; 256];
        let mut hdiv = [0i32; 256];
        for i in 1..256 {
            sdiv[i] = ((255 << HSV_SHIFT) as f64 / i as f64).round() as i32;
            hdiv[i] = ((HUE_RANGE << HSV_SHIFT) as f64 / (6.0 * i as f64)).round() as i32;
        }
        DivTables { sdiv, hdiv }
    })
}

pub(super) fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let t = tables();
    let (r, g, b) = (r as i32, g as i32, b as i32);

    let v = r.max(g).max(b);
    let diff = v - r.min(g).min(b);

    let s = (diff * t.sdiv[v as usize] + ROUND) >> HSV_SHIFT;

    let mut h = if v == r {
        g - b
    } else if v == g {
        b - r + 2 * diff
    } else {
        r - g + 4 * diff
    };
    h = (h * t.hdiv[diff as usize] + ROUND) >> HSV_SHIFT;
    if h < 0 {
        h += HUE_RANGE;
    }

    (h as u8, s as u8, v as u8)
}
