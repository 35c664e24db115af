//! Spatial calibration supplied by an external module
//!
//! The pipeline never measures pixels per millimeter itself. A caller that
//! has calibrated its camera passes the ratio in; everything else reports
//! areas in pixels.

use serde::{Deserialize, Serialize};

/// Pixels-per-millimeter ratio, or uncalibrated
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpatialScale {
    px_per_mm: Option<f64>,
}

impl SpatialScale {
    /// Wrap an externally supplied ratio
    ///
    /// Non-finite or non-positive ratios are ignored with a warning.
    pub fn new(px_per_mm: Option<f64>) -> Self {
        match px_per_mm {
            Some(ratio) if ratio.is_finite() && ratio > 0.0 => Self {
                px_per_mm: Some(ratio),
            },
            Some(ratio) => {
                log::warn!("ignoring spatial calibration {}: not a positive ratio", ratio);
                Self::uncalibrated()
            }
            None => Self::uncalibrated(),
        }
    }

    pub fn uncalibrated() -> Self {
        Self { px_per_mm: None }
    }

    pub fn px_per_mm(&self) -> Option<f64> {
        self.px_per_mm
    }

    pub fn is_calibrated(&self) -> bool {
        self.px_per_mm.is_some()
    }

    /// Physical area of `area_px` pixels in mm², if calibrated
    pub fn area_mm2(&self, area_px: u64) -> Option<f64> {
        self.px_per_mm.map(|ratio| area_px as f64 / (ratio * ratio))
    }
}
