//! RGBA pixel buffer handed to the analysis pipeline

use image::RgbaImage;

use crate::constants::pixel::MIN_ALPHA;
use crate::error::{AnalysisError, Result};

const CHANNELS: usize = 4;

/// An RGBA8 image, row major, 4 bytes per pixel.
///
/// The pipeline only borrows samples and never writes to them: stages that
/// need a modified image (white balance) produce a new sample. Pixel writes
/// through [`ImageSample::put_pixel`] are for building synthetic samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSample {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageSample {
    /// Wrap a raw RGBA buffer.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidImage` if the buffer length does not
    /// match `width * height * 4`. Zero-sized images are accepted.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or_else(|| AnalysisError::InvalidImage {
                reason: format!("{}x{} overflows the addressable size", width, height),
            })?;

        if data.len() != expected {
            return Err(AnalysisError::InvalidImage {
                reason: format!(
                    "expected {} bytes for {}x{} RGBA, got {}",
                    expected,
                    width,
                    height,
                    data.len()
                ),
            });
        }

        Ok(Self { width, height, data })
    }

    /// Fill a `width x height` image with a single RGBA color
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let data = rgba.iter().copied().cycle().take(count * CHANNELS).collect();
        Self { width, height, data }
    }

    /// Adapt an `image` crate buffer
    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw RGBA bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// RGBA value at `(x, y)`; coordinates must be inside the image
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Overwrite one pixel. Used to build synthetic samples.
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        self.data[i..i + CHANNELS].copy_from_slice(&rgba);
    }

    /// Iterate over all pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// New sample with `f` applied to the RGB channels of every pixel.
    /// Alpha is passed through.
    pub fn map_rgb<F>(&self, mut f: F) -> Self
    where
        F: FnMut([u8; 3]) -> [u8; 3],
    {
        let mut data = Vec::with_capacity(self.data.len());
        for p in self.data.chunks_exact(CHANNELS) {
            let [r, g, b] = f([p[0], p[1], p[2]]);
            data.extend_from_slice(&[r, g, b, p[3]]);
        }
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Whether a pixel's alpha makes it eligible for analysis
#[inline]
pub fn is_opaque(rgba: [u8; 4]) -> bool {
    rgba[3] >= MIN_ALPHA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_length() {
        let err = ImageSample::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidImage { .. }));
    }

    #[test]
    fn test_accepts_zero_size() {
        let sample = ImageSample::new(0, 0, Vec::new()).unwrap();
        assert!(sample.is_empty());
        assert_eq!(sample.pixels().count(), 0);
    }

    #[test]
    fn test_filled_and_pixel_access() {
        let mut sample = ImageSample::filled(3, 2, [10, 20, 30, 255]);
        assert_eq!(sample.as_bytes().len(), 24);
        assert_eq!(sample.pixel(2, 1), [10, 20, 30, 255]);

        sample.put_pixel(1, 1, [1, 2, 3, 4]);
        assert_eq!(sample.pixel(1, 1), [1, 2, 3, 4]);
        assert_eq!(sample.pixel(0, 1), [10, 20, 30, 255]);
    }

    #[test]
    fn test_map_rgb_preserves_alpha_and_source() {
        let source = ImageSample::filled(2, 2, [100, 100, 100, 7]);
        let mapped = source.map_rgb(|[r, g, b]| [r / 2, g, b.saturating_add(200)]);
        assert_eq!(mapped.pixel(0, 0), [50, 100, 255, 7]);
        assert_eq!(source.pixel(0, 0), [100, 100, 100, 7]);
    }

    #[test]
    fn test_from_rgba_image() {
        let image = RgbaImage::from_pixel(4, 3, image::Rgba([1, 2, 3, 255]));
        let sample = ImageSample::from_rgba_image(image);
        assert_eq!((sample.width(), sample.height()), (4, 3));
        assert_eq!(sample.pixel(3, 2), [1, 2, 3, 255]);
    }

    #[test]
    fn test_is_opaque() {
        assert!(is_opaque([0, 0, 0, 128]));
        assert!(!is_opaque([0, 0, 0, 127]));
    }
}
