// ---- color-space conversion applied to both the target and every render before differencing ----

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConfigError;

/// which channels take part in the pixel comparison
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    /// full color: R, G and B compared independently
    #[default]
    Rgb,
    /// luminance only (BT.709 luma), one channel per pixel
    Luma,
}

impl ColorSpace {
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            ColorSpace::Rgb => 3,
            ColorSpace::Luma => 1,
        }
    }

    /// pack an opaque RGBA8 buffer into this color space's channels.
    /// alpha is dropped: targets are flattened and renders are drawn on an opaque canvas.
    pub fn convert(self, rgba: &[u8]) -> Vec<u8> {
        profiling::scope!("ColorSpace::convert");
        debug_assert_eq!(rgba.len() % 4, 0);
        let pixels = rgba.len() / 4;
        let mut out = Vec::with_capacity(pixels * self.channels());
        match self {
            ColorSpace::Rgb => {
                for px in rgba.chunks_exact(4) {
                    out.extend_from_slice(&px[..3]);
                }
            }
            ColorSpace::Luma => {
                for px in rgba.chunks_exact(4) {
                    out.push(luma_709_u8(px[0], px[1], px[2]));
                }
            }
        }
        out
    }
}

impl FromStr for ColorSpace {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(ColorSpace::Rgb),
            "luma" | "gray" | "grey" | "grayscale" => Ok(ColorSpace::Luma),
            _ => Err(ConfigError::UnknownColorSpace(s.to_string())),
        }
    }
}

/// approximate BT.709 luma in 0..255 using integer math.
/// Y ≈ 0.2126*R + 0.7152*G + 0.0722*B  →  (54*R + 183*G + 19*B) >> 8
#[inline]
pub fn luma_709_u8(r: u8, g: u8, b: u8) -> u8 {
    let y = 54u32 * (r as u32) + 183u32 * (g as u32) + 19u32 * (b as u32);
    ((y >> 8).min(255)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_drops_alpha() {
        let px = [1, 2, 3, 255, 4, 5, 6, 255];
        assert_eq!(ColorSpace::Rgb.convert(&px), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_luma_extremes() {
        let px = [0, 0, 0, 255, 255, 255, 255, 255];
        let y = ColorSpace::Luma.convert(&px);
        assert_eq!(y[0], 0);
        // 54+183+19 = 256 → exactly 255 after the shift
        assert_eq!(y[1], 255);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("RGB".parse::<ColorSpace>().unwrap(), ColorSpace::Rgb);
        assert_eq!("grayscale".parse::<ColorSpace>().unwrap(), ColorSpace::Luma);
        assert!(matches!("hsv".parse::<ColorSpace>(), Err(ConfigError::UnknownColorSpace(_))));
    }
}
