//! Cast-shadow classification
//!
//! A strip lying on a light tray throws a grey, desaturated shadow that is
//! darker than the fry body but has none of its golden hue. Genuine surface
//! darkening (dark ends, burnt spots) keeps the warm hue. The predicate is
//! relative to the baseline of the image, so it works across exposures:
//!
//! - value at least `min_relative_darkening` below the baseline mean value
//! - saturation below `max_saturation_ratio` of the baseline mean saturation
//! - hue outside the golden-brown band

use crate::color::analysis::Baseline;
use crate::color::conversion::Hsv;
use crate::config::ShadowConfig;

/// Per-pixel shadow predicate, fixed for one image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowClassifier {
    max_value: f32,
    max_saturation: f32,
    golden_hue_min: f32,
    golden_hue_max: f32,
    cell_fraction: f32,
    enabled: bool,
}

impl ShadowClassifier {
    /// Build the predicate from the baseline of the image
    ///
    /// A zero baseline mean value (nothing qualifies, or a black image)
    /// disables shadow classification.
    pub fn new(baseline: &Baseline, config: &ShadowConfig) -> Self {
        let enabled = baseline.mean_value > 0.0;
        let classifier = Self {
            max_value: baseline.mean_value * (1.0 - config.min_relative_darkening),
            max_saturation: baseline.mean_saturation * config.max_saturation_ratio,
            golden_hue_min: config.golden_hue_min,
            golden_hue_max: config.golden_hue_max,
            cell_fraction: config.cell_shadow_fraction,
            enabled,
        };
        log::debug!(
            "shadow predicate: v <= {:.3}, s < {:.3}, enabled {}",
            classifier.max_value,
            classifier.max_saturation,
            enabled
        );
        classifier
    }

    /// A classifier that never reports shadow
    pub fn disabled(config: &ShadowConfig) -> Self {
        Self {
            max_value: 0.0,
            max_saturation: 0.0,
            golden_hue_min: config.golden_hue_min,
            golden_hue_max: config.golden_hue_max,
            cell_fraction: config.cell_shadow_fraction,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a (qualifying) pixel is cast shadow
    #[inline]
    pub fn is_shadow(&self, hsv: &Hsv) -> bool {
        self.enabled
            && hsv.value <= self.max_value
            && hsv.saturation < self.max_saturation
            && !(self.golden_hue_min..=self.golden_hue_max).contains(&hsv.hue)
    }

    /// Whether a cell with `shadow` of `qualifying` pixels is a whole-cell shadow
    pub fn is_shadow_cell(&self, shadow: usize, qualifying: usize) -> bool {
        qualifying > 0 && shadow as f32 / qualifying as f32 > self.cell_fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline(mean_saturation: f32, mean_value: f32) -> Baseline {
        Baseline {
            mean_saturation,
            mean_value,
            pixel_count: 100,
        }
    }

    #[test]
    fn test_grey_shadow_detected() {
        let classifier = ShadowClassifier::new(&baseline(0.45, 0.63), &ShadowConfig::default());
        assert!(classifier.is_shadow(&Hsv::new(210.0, 0.1, 0.3)));
        assert!(classifier.is_shadow(&Hsv::new(0.0, 0.0, 0.2)));
    }

    #[test]
    fn test_golden_darkening_is_not_shadow() {
        let classifier = ShadowClassifier::new(&baseline(0.45, 0.63), &ShadowConfig::default());
        // Dark but still golden brown
        assert!(!classifier.is_shadow(&Hsv::new(30.0, 0.1, 0.2)));
        assert!(!classifier.is_shadow(&Hsv::new(55.0, 0.1, 0.2)));
        assert!(!classifier.is_shadow(&Hsv::new(15.0, 0.1, 0.2)));
    }

    #[test]
    fn test_requires_darkening_and_desaturation() {
        let classifier = ShadowClassifier::new(&baseline(0.45, 0.63), &ShadowConfig::default());
        // Not dark enough: 0.63 * 0.65 = 0.4095
        assert!(!classifier.is_shadow(&Hsv::new(210.0, 0.1, 0.45)));
        // Too saturated: 0.45 * 0.65 = 0.2925
        assert!(!classifier.is_shadow(&Hsv::new(210.0, 0.35, 0.3)));
    }

    #[test]
    fn test_zero_baseline_disables() {
        let classifier = ShadowClassifier::new(&baseline(0.0, 0.0), &ShadowConfig::default());
        assert!(!classifier.is_enabled());
        assert!(!classifier.is_shadow(&Hsv::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_shadow_cell_fraction() {
        let classifier = ShadowClassifier::disabled(&ShadowConfig::default());
        assert!(classifier.is_shadow_cell(51, 100));
        assert!(!classifier.is_shadow_cell(50, 100));
        assert!(!classifier.is_shadow_cell(0, 0));
    }
}
