//! White balance estimation and correction
//!
//! Looks for a near-neutral reference in the scene (a tray edge, a grey
//! card, the white background) and scales each channel so that reference
//! becomes grey. The image is tiled into `grid_divisions²` patches:
//!
//! - a patch is a neutral candidate when its R, G and B means lie within
//!   `max_channel_spread` of each other
//! - the brightest candidate (BT.601 luminance) is the reference
//! - a reference darker than `min_luminance` is not trusted and the gains
//!   stay at identity
//!
//! The corrected image is always a new sample; the texture estimator keeps
//! working on the original.

use serde::{Deserialize, Serialize};

use crate::color::conversion::luminance;
use crate::config::WhiteBalanceConfig;
use crate::sample::ImageSample;

/// Per-channel multipliers derived from the neutral reference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WhiteBalanceGains {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    /// Whether a trusted reference was found
    pub applied: bool,
}

impl WhiteBalanceGains {
    pub fn identity() -> Self {
        Self {
            red: 1.0,
            green: 1.0,
            blue: 1.0,
            applied: false,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.red == 1.0 && self.green == 1.0 && self.blue == 1.0
    }

    /// Corrected copy of `sample`; alpha is preserved
    pub fn apply(&self, sample: &ImageSample) -> ImageSample {
        if self.is_identity() {
            return sample.clone();
        }
        let scale = |c: u8, gain: f64| (c as f64 * gain).round().clamp(0.0, 255.0) as u8;
        sample.map_rgb(|[r, g, b]| [scale(r, self.red), scale(g, self.green), scale(b, self.blue)])
    }
}

impl Default for WhiteBalanceGains {
    fn default() -> Self {
        Self::identity()
    }
}

/// Mean color of one patch
#[derive(Debug, Clone, Copy, PartialEq)]
struct PatchMean {
    rgb: [f64; 3],
    luminance: f64,
}

impl PatchMean {
    fn channel_spread(&self) -> f64 {
        let [r, g, b] = self.rgb;
        (r - g).abs().max((g - b).abs()).max((r - b).abs())
    }
}

/// Neutral-patch white balance estimator
#[derive(Debug, Clone)]
pub struct WhiteBalanceEstimator {
    config: WhiteBalanceConfig,
}

impl WhiteBalanceEstimator {
    pub fn new(config: &WhiteBalanceConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Estimate channel gains from the brightest neutral patch
    pub fn estimate(&self, sample: &ImageSample) -> WhiteBalanceGains {
        if !self.config.enabled {
            return WhiteBalanceGains::identity();
        }

        let reference = self
            .patch_means(sample)
            .into_iter()
            .filter(|p| p.channel_spread() < self.config.max_channel_spread)
            .max_by(|a, b| a.luminance.total_cmp(&b.luminance));

        let Some(reference) = reference else {
            log::debug!("white balance: no neutral patch, skipping");
            return WhiteBalanceGains::identity();
        };
        if reference.luminance < self.config.min_luminance {
            log::debug!(
                "white balance: reference luminance {:.1} too dark, skipping",
                reference.luminance
            );
            return WhiteBalanceGains::identity();
        }

        let gray = reference.rgb.iter().sum::<f64>() / 3.0;
        let gain = |mean: f64| if mean < 1.0 { 1.0 } else { gray / mean };
        let gains = WhiteBalanceGains {
            red: gain(reference.rgb[0]),
            green: gain(reference.rgb[1]),
            blue: gain(reference.rgb[2]),
            applied: true,
        };

        log::debug!(
            "white balance: reference {:?} (luma {:.1}), gains ({:.3}, {:.3}, {:.3})",
            reference.rgb,
            reference.luminance,
            gains.red,
            gains.green,
            gains.blue
        );
        gains
    }

    /// Patch means over an exact-coverage tiling; empty patches are skipped
    fn patch_means(&self, sample: &ImageSample) -> Vec<PatchMean> {
        let n = self.config.grid_divisions.max(1) as u64;
        let (width, height) = (sample.width() as u64, sample.height() as u64);
        let mut patches = Vec::with_capacity((n * n) as usize);

        for py in 0..n {
            let (y0, y1) = (py * height / n, (py + 1) * height / n);
            for px in 0..n {
                let (x0, x1) = (px * width / n, (px + 1) * width / n);
                let count = (x1 - x0) * (y1 - y0);
                if count == 0 {
                    continue;
                }

                let mut sums = [0u64; 3];
                for y in y0..y1 {
                    for x in x0..x1 {
                        let p = sample.pixel(x as u32, y as u32);
                        sums[0] += p[0] as u64;
                        sums[1] += p[1] as u64;
                        sums[2] += p[2] as u64;
                    }
                }
                let rgb = sums.map(|s| s as f64 / count as f64);
                patches.push(PatchMean {
                    rgb,
                    luminance: luminance(rgb[0], rgb[1], rgb[2]),
                });
            }
        }
        patches
    }
}

impl Default for WhiteBalanceEstimator {
    fn default() -> Self {
        Self::new(&WhiteBalanceConfig::default())
    }
}
