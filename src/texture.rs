//! Crust crispness ("crunch") estimator
//!
//! A patch-variance heuristic over the luminance of the original, not
//! white-balanced, image. Inside every complete `patch_size` square, each
//! row contributes its squared mean as low-frequency energy and the squared
//! deviations from that mean as high-frequency energy. A blistered, crisp
//! crust has a lot of local contrast; a soggy, smooth surface has little.
//! This is not a spectral transform.

use crate::color::conversion::luminance;
use crate::config::TextureConfig;
use crate::constants::texture::{CRUNCH_GAIN, ENERGY_EPSILON};
use crate::sample::ImageSample;

#[derive(Debug, Clone)]
pub struct TextureEstimator {
    patch_size: u32,
}

impl TextureEstimator {
    pub fn new(config: &TextureConfig) -> Self {
        Self {
            patch_size: config.patch_size.max(1),
        }
    }

    /// Crunch score in [0, 100]; 0 when the image has no complete patch
    pub fn crunch_score(&self, sample: &ImageSample) -> u8 {
        let p = self.patch_size;
        let (width, height) = (sample.width(), sample.height());
        let mut low = 0.0f64;
        let mut high = 0.0f64;
        let mut row = Vec::with_capacity(p as usize);

        for py in (0..height / p).map(|i| i * p) {
            for px in (0..width / p).map(|i| i * p) {
                for y in py..py + p {
                    row.clear();
                    row.extend((px..px + p).map(|x| {
                        let [r, g, b, _] = sample.pixel(x, y);
                        luminance(r as f64, g as f64, b as f64)
                    }));
                    let mean = row.iter().sum::<f64>() / p as f64;
                    low += mean * mean;
                    high += row.iter().map(|l| (l - mean) * (l - mean)).sum::<f64>();
                }
            }
        }

        let score = (CRUNCH_GAIN * high / (high + low + ENERGY_EPSILON))
            .round()
            .clamp(0.0, 100.0) as u8;
        log::debug!(
            "texture: low {:.1}, high {:.1}, crunch {}",
            low,
            high,
            score
        );
        score
    }
}

impl Default for TextureEstimator {
    fn default() -> Self {
        Self::new(&TextureConfig::default())
    }
}
