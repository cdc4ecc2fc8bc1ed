//! RGB to HSV conversion and bin assignment.
//!
//! Histograms are taken in HSV space, which separates colour from brightness
//! and tends to order photos more naturally than raw RGB.

/// Hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

/// Convert an 8-bit RGB triple to HSV
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let saturation = if max == 0.0 { 0.0 } else { delta / max };

    Hsv {
        hue,
        saturation,
        value: max,
    }
}

/// Map `value` in `[0, range]` onto one of `bins` buckets.
///
/// The upper edge falls into the last bucket.
pub fn bin_index(value: f64, range: f64, bins: usize) -> usize {
    let scaled = (value / range * bins as f64) as usize;
    scaled.min(bins - 1)
}
