use image::{imageops, RgbaImage};

use crate::error::ConfigError;

/// owned, un-premultiplied RGBA8 pixel buffer. this is the only image type that
/// crosses the library boundary (targets come in, renders go out).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ConfigError> {
        let expected = (width as usize) * (height as usize) * 4;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(ConfigError::MalformedRaster { width, height, len: data.len(), expected });
        }
        Ok(Self { width, height, data })
    }

    /// raster where every pixel has the same RGBA value
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba.repeat((width as usize) * (height as usize));
        Self { width, height, data }
    }

    // renderer output: the length is known to match and every pixel is opaque
    pub(crate) fn from_opaque_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width as usize) * (height as usize) * 4);
        Self { width, height, data }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn pixel_offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.pixel_offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// composite over an opaque white background so that translucent targets compare
    /// against the same backdrop renders are drawn on
    pub fn flatten_over_white(&self) -> Raster {
        profiling::scope!("flatten_over_white");
        let mut data = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            let a = px[3] as u32;
            for &c in &px[..3] {
                // c*a + 255*(255-a), rounded divide by 255
                let v = (c as u32 * a + 255 * (255 - a) + 127) / 255;
                data.push(v as u8);
            }
            data.push(255);
        }
        Raster { width: self.width, height: self.height, data }
    }

    /// dimensions after scaling the longer side down to `resolution` pixels.
    /// never upscales and never collapses a side to zero.
    pub fn evaluation_size(&self, resolution: u32) -> (u32, u32) {
        let longest = self.width.max(self.height);
        if resolution >= longest {
            return (self.width, self.height);
        }
        let scale = resolution as f64 / longest as f64;
        let w = ((self.width as f64 * scale).round() as u32).max(1);
        let h = ((self.height as f64 * scale).round() as u32).max(1);
        (w, h)
    }

    /// resample to the given size with the image crate's Catmull-Rom filter
    pub fn resized(&self, width: u32, height: u32) -> Raster {
        profiling::scope!("Raster::resized");
        if width == self.width && height == self.height {
            return self.clone();
        }
        let Some(buf) = RgbaImage::from_raw(self.width, self.height, self.data.clone()) else {
            // unreachable while the length invariant of `new` holds
            return self.clone();
        };
        let resized = imageops::resize(&buf, width, height, imageops::FilterType::CatmullRom);
        Raster { width, height, data: resized.into_raw() }
    }

    pub fn to_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
    }
}

impl From<RgbaImage> for Raster {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Raster { width, height, data: img.into_raw() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        let err = Raster::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedRaster { expected: 16, .. }));
    }

    #[test]
    fn test_new_rejects_empty() {
        assert!(Raster::new(0, 4, Vec::new()).is_err());
    }

    #[test]
    fn test_flatten_transparent_is_white() {
        let r = Raster::filled(3, 2, [10, 20, 30, 0]);
        let flat = r.flatten_over_white();
        assert_eq!(flat.pixel(1, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn test_flatten_opaque_is_unchanged() {
        let r = Raster::filled(2, 2, [10, 20, 30, 255]);
        assert_eq!(r.flatten_over_white().data(), r.data());
    }

    #[test]
    fn test_pixel_index_beyond_u32_range() {
        // 70000 x 70000 x 4 bytes does not fit in u32; the index must be computed in usize
        let r = Raster { width: 70_000, height: 2, data: Vec::new() };
        let i = (70_000usize + 5) * 4;
        assert_eq!(r.pixel_offset(5, 1), i);
        let wide = Raster { width: 70_000, height: 70_000, data: Vec::new() };
        assert_eq!(wide.pixel_offset(69_999, 69_999), 70_000usize * 70_000 * 4 - 4);
    }

    #[test]
    fn test_pixel_reads_rgba() {
        let mut data = vec![0u8; 2 * 2 * 4];
        data[12..16].copy_from_slice(&[1, 2, 3, 4]);
        let r = Raster::new(2, 2, data).unwrap();
        assert_eq!(r.pixel(1, 1), [1, 2, 3, 4]);
    }

    #[test]
    fn test_evaluation_size_keeps_aspect() {
        let r = Raster::filled(300, 150, [0, 0, 0, 255]);
        assert_eq!(r.evaluation_size(75), (75, 38));
        // no upscaling
        assert_eq!(r.evaluation_size(1000), (300, 150));
    }

    #[test]
    fn test_resized_solid_color_stays_solid() {
        let r = Raster::filled(40, 20, [200, 100, 50, 255]);
        let small = r.resized(10, 5);
        assert_eq!(small.width(), 10);
        assert_eq!(small.height(), 5);
        assert_eq!(small.pixel(4, 2), [200, 100, 50, 255]);
    }
}
