//! Whole-image color statistics
//!
//! Two passes over the white-balanced sample:
//! - a baseline pass (mean saturation and value of the fry pixels) that the
//!   shadow classifier normalizes against
//! - the statistics pass proper, which skips shadow pixels and produces the
//!   means, median hue, burnt/dark/light ratios and hue histogram used by
//!   the scorers
//!
//! Both passes only look at qualifying pixels: alpha >= 128 and outside the
//! near-white background band.

use serde::{Deserialize, Serialize};

use crate::color::conversion::{rgb_to_hsv, Hsv};
use crate::constants::pixel::*;
use crate::detection::shadow::ShadowClassifier;
use crate::sample::{is_opaque, ImageSample};

/// Means used to normalize the shadow predicate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub mean_saturation: f32,
    pub mean_value: f32,
    /// Qualifying pixels seen by the baseline pass
    pub pixel_count: usize,
}

/// Global color statistics over the analysed (non-shadow) fry pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    /// Pixels that contributed to the statistics
    pub pixel_count: usize,
    /// Qualifying pixels suppressed as cast shadow
    pub shadow_pixel_count: usize,
    pub mean_red: f64,
    pub mean_green: f64,
    pub mean_blue: f64,
    pub mean_hue: f32,
    pub mean_saturation: f32,
    pub mean_value: f32,
    pub median_hue: f32,
    pub burnt_ratio: f32,
    pub dark_ratio: f32,
    pub light_ratio: f32,
    /// Shadow pixels over all qualifying pixels
    pub shadow_suppression_ratio: f32,
    /// Pixel counts in 10° hue bins
    #[serde(default)]
    pub hue_histogram: Vec<u32>,
}

/// Near-white background band, excluded from every statistic
#[inline]
pub fn is_background(hsv: &Hsv) -> bool {
    hsv.saturation < BACKGROUND_MAX_SATURATION && hsv.value > BACKGROUND_MIN_VALUE
}

/// HSV of a pixel that takes part in the analysis, `None` for transparent
/// or background pixels
#[inline]
pub fn qualifying_hsv(rgba: [u8; 4]) -> Option<Hsv> {
    if !is_opaque(rgba) {
        return None;
    }
    let hsv = rgb_to_hsv(rgba[0], rgba[1], rgba[2]);
    if is_background(&hsv) {
        None
    } else {
        Some(hsv)
    }
}

/// Pixel-level burnt class
#[inline]
pub fn is_burnt(hsv: &Hsv) -> bool {
    hsv.value < BURNT_MAX_VALUE && hsv.saturation < BURNT_MAX_SATURATION
}

/// Pixel-level dark class (never overlaps burnt)
#[inline]
pub fn is_dark(hsv: &Hsv) -> bool {
    !is_burnt(hsv) && hsv.value < DARK_MAX_VALUE
}

/// Pixel-level light class
#[inline]
pub fn is_light(hsv: &Hsv) -> bool {
    hsv.value > LIGHT_MIN_VALUE && hsv.saturation < LIGHT_MAX_SATURATION
}

/// Color analyzer computing the baseline and global statistics passes
#[derive(Debug, Default, Clone, Copy)]
pub struct ColorAnalyzer;

impl ColorAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Mean saturation and value of all qualifying pixels
    pub fn baseline(&self, sample: &ImageSample) -> Baseline {
        let mut count = 0usize;
        let mut sum_s = 0.0f64;
        let mut sum_v = 0.0f64;

        for hsv in sample.pixels().filter_map(qualifying_hsv) {
            count += 1;
            sum_s += hsv.saturation as f64;
            sum_v += hsv.value as f64;
        }

        let denom = count.max(1) as f64;
        Baseline {
            mean_saturation: (sum_s / denom) as f32,
            mean_value: (sum_v / denom) as f32,
            pixel_count: count,
        }
    }

    /// Statistics over qualifying pixels that are not cast shadow
    pub fn global_stats(&self, sample: &ImageSample, shadow: &ShadowClassifier) -> GlobalStats {
        let mut count = 0usize;
        let mut shadow_count = 0usize;
        let mut sums = [0.0f64; 6];
        let mut burnt = 0usize;
        let mut dark = 0usize;
        let mut light = 0usize;
        let mut hues: Vec<f32> = Vec::new();
        let mut histogram = vec![0u32; HUE_HISTOGRAM_BINS];
        let bin_width = 360.0 / HUE_HISTOGRAM_BINS as f32;

        for rgba in sample.pixels() {
            let Some(hsv) = qualifying_hsv(rgba) else {
                continue;
            };
            if shadow.is_shadow(&hsv) {
                shadow_count += 1;
                continue;
            }

            count += 1;
            sums[0] += rgba[0] as f64;
            sums[1] += rgba[1] as f64;
            sums[2] += rgba[2] as f64;
            sums[3] += hsv.hue as f64;
            sums[4] += hsv.saturation as f64;
            sums[5] += hsv.value as f64;

            if is_burnt(&hsv) {
                burnt += 1;
            } else if is_dark(&hsv) {
                dark += 1;
            }
            if is_light(&hsv) {
                light += 1;
            }

            hues.push(hsv.hue);
            let bin = ((hsv.hue / bin_width) as usize).min(HUE_HISTOGRAM_BINS - 1);
            histogram[bin] += 1;
        }

        let median_hue = if hues.is_empty() {
            DEFAULT_MEDIAN_HUE
        } else {
            hues.sort_by(f32::total_cmp);
            hues[hues.len() / 2]
        };

        let denom = count.max(1) as f64;
        let ratio = |n: usize| (n as f64 / denom) as f32;

        let stats = GlobalStats {
            pixel_count: count,
            shadow_pixel_count: shadow_count,
            mean_red: sums[0] / denom,
            mean_green: sums[1] / denom,
            mean_blue: sums[2] / denom,
            mean_hue: (sums[3] / denom) as f32,
            mean_saturation: (sums[4] / denom) as f32,
            mean_value: (sums[5] / denom) as f32,
            median_hue,
            burnt_ratio: ratio(burnt),
            dark_ratio: ratio(dark),
            light_ratio: ratio(light),
            shadow_suppression_ratio: (shadow_count as f64 / (count + shadow_count).max(1) as f64)
                as f32,
            hue_histogram: histogram,
        };

        log::debug!(
            "global stats: {} px, mean hsv ({:.1}, {:.3}, {:.3}), median hue {:.0}, burnt {:.3}, dark {:.3}, light {:.3}, shadow {:.3}",
            stats.pixel_count,
            stats.mean_hue,
            stats.mean_saturation,
            stats.mean_value,
            stats.median_hue,
            stats.burnt_ratio,
            stats.dark_ratio,
            stats.light_ratio,
            stats.shadow_suppression_ratio
        );

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::conversion::hsv_to_rgb;
    use crate::config::ShadowConfig;

    fn opaque(hsv: Hsv) -> [u8; 4] {
        let [r, g, b] = hsv_to_rgb(hsv);
        [r, g, b, 255]
    }

    fn no_shadow() -> ShadowClassifier {
        ShadowClassifier::disabled(&ShadowConfig::default())
    }

    #[test]
    fn test_background_excluded() {
        let mut sample = ImageSample::filled(10, 10, [250, 250, 250, 255]);
        sample.put_pixel(0, 0, opaque(Hsv::new(35.0, 0.45, 0.63)));

        let stats = ColorAnalyzer::new().global_stats(&sample, &no_shadow());
        assert_eq!(stats.pixel_count, 1);
        assert_eq!(stats.median_hue, 35.0);
        assert_eq!(stats.hue_histogram.iter().sum::<u32>(), 1);
        assert_eq!(stats.hue_histogram[3], 1);
    }

    #[test]
    fn test_transparent_image_defaults() {
        let sample = ImageSample::filled(8, 8, [120, 80, 40, 0]);
        let analyzer = ColorAnalyzer::new();

        let baseline = analyzer.baseline(&sample);
        assert_eq!(baseline.pixel_count, 0);
        assert_eq!(baseline.mean_value, 0.0);

        let stats = analyzer.global_stats(&sample, &no_shadow());
        assert_eq!(stats.pixel_count, 0);
        assert_eq!(stats.median_hue, DEFAULT_MEDIAN_HUE);
        assert_eq!(stats.burnt_ratio, 0.0);
        assert_eq!(stats.mean_red, 0.0);
        assert_eq!(stats.shadow_suppression_ratio, 0.0);
    }

    #[test]
    fn test_ratio_buckets() {
        // 4 pixels: burnt, dark, light, golden
        let mut sample = ImageSample::filled(4, 1, [0, 0, 0, 255]);
        sample.put_pixel(0, 0, opaque(Hsv::new(20.0, 0.1, 0.1)));
        sample.put_pixel(1, 0, opaque(Hsv::new(30.0, 0.5, 0.3)));
        sample.put_pixel(2, 0, opaque(Hsv::new(45.0, 0.15, 0.9)));
        sample.put_pixel(3, 0, opaque(Hsv::new(35.0, 0.45, 0.63)));

        let stats = ColorAnalyzer::new().global_stats(&sample, &no_shadow());
        assert_eq!(stats.pixel_count, 4);
        assert!((stats.burnt_ratio - 0.25).abs() < 1e-6);
        assert!((stats.dark_ratio - 0.25).abs() < 1e-6);
        assert!((stats.light_ratio - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_median_hue_is_middle_element() {
        let mut sample = ImageSample::filled(3, 1, [0, 0, 0, 255]);
        sample.put_pixel(0, 0, opaque(Hsv::new(10.0, 0.8, 0.6)));
        sample.put_pixel(1, 0, opaque(Hsv::new(90.0, 0.8, 0.6)));
        sample.put_pixel(2, 0, opaque(Hsv::new(30.0, 0.8, 0.6)));

        let stats = ColorAnalyzer::new().global_stats(&sample, &no_shadow());
        assert_eq!(stats.median_hue, 30.0);
        assert!((stats.mean_hue - 130.0 / 3.0).abs() < 0.5);
    }

    #[test]
    fn test_shadow_pixels_counted_not_analysed() {
        // Golden body with a grey-blue cast shadow strip
        let mut sample = ImageSample::filled(10, 10, opaque(Hsv::new(35.0, 0.45, 0.63)));
        for x in 0..10 {
            sample.put_pixel(x, 0, opaque(Hsv::new(220.0, 0.1, 0.3)));
        }
        let analyzer = ColorAnalyzer::new();
        let baseline = analyzer.baseline(&sample);
        let shadow = ShadowClassifier::new(&baseline, &ShadowConfig::default());
        let stats = analyzer.global_stats(&sample, &shadow);

        assert_eq!(stats.shadow_pixel_count, 10);
        assert_eq!(stats.pixel_count, 90);
        assert!((stats.shadow_suppression_ratio - 0.1).abs() < 1e-6);
        assert_eq!(stats.median_hue, 35.0);
    }
}
