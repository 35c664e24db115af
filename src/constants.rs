//! Reference values and classification thresholds for fry quality analysis
//!
//! This module contains compile-time constants for color conversion,
//! pixel classification and scoring. Values that an operator may want to
//! tune per production line are mirrored in [`crate::config`]; the ones here
//! define the fixed grading scale.

/// D65 reference white used by the Lab conversion
///
/// The companding follows the CIE 1976 definition with the rounded white
/// point used by most food colorimetry tooling.
pub mod d65 {
    /// D65 white point in CIE XYZ color space
    pub const WHITE_POINT_XYZ: [f64; 3] = [0.9505, 1.0, 1.089];

    /// Threshold between the cube-root and linear branch of f(t)
    pub const LAB_EPSILON: f64 = 0.008856;

    /// Slope of the linear branch of f(t)
    pub const LAB_KAPPA_SLOPE: f64 = 7.787;
}

/// ITU-R BT.601 luma weights
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Reference "target gold" fry color (sRGB) for ΔE2000 reporting
pub const TARGET_GOLD_RGB: [u8; 3] = [198, 148, 72];

/// Pixel-level classification bands (HSV, saturation/value in [0, 1])
pub mod pixel {
    /// Minimum alpha for a pixel to take part in any statistic
    pub const MIN_ALPHA: u8 = 128;

    /// Near-white background: saturation below this...
    pub const BACKGROUND_MAX_SATURATION: f32 = 0.05;
    /// ...and value above this
    pub const BACKGROUND_MIN_VALUE: f32 = 0.92;

    /// Burnt pixel: value below this and saturation below `BURNT_MAX_SATURATION`
    pub const BURNT_MAX_VALUE: f32 = 0.2;
    pub const BURNT_MAX_SATURATION: f32 = 0.3;

    /// Dark pixel (not burnt): value below this
    pub const DARK_MAX_VALUE: f32 = 0.35;

    /// Light pixel: value above this and saturation below `LIGHT_MAX_SATURATION`
    pub const LIGHT_MIN_VALUE: f32 = 0.85;
    pub const LIGHT_MAX_SATURATION: f32 = 0.2;

    /// Median hue reported when no pixel qualifies
    pub const DEFAULT_MEDIAN_HUE: f32 = 30.0;

    /// Number of 10° bins in the hue histogram
    pub const HUE_HISTOGRAM_BINS: usize = 36;
}

/// Cell-level defect rules, evaluated in declaration order
pub mod defect_rules {
    pub const BURNT_MAX_VALUE: f32 = 0.22;
    pub const BURNT_MAX_SATURATION: f32 = 0.35;

    /// Minimum drop below the grid mean value for a dark cell
    pub const DARK_MIN_VALUE_DROP: f32 = 0.28;
    pub const DARK_MIN_SATURATION: f32 = 0.18;

    pub const LIGHT_MIN_VALUE: f32 = 0.87;
    pub const LIGHT_MAX_SATURATION: f32 = 0.22;
    /// Severity gain applied to the excess over `LIGHT_MIN_VALUE`
    pub const LIGHT_SEVERITY_GAIN: f32 = 5.0;

    /// Mottled cell: hue differs from the grid mean by more than this (degrees)
    pub const MOTTLED_MIN_HUE_DIFF: f32 = 28.0;
    /// ...and is darker than the grid mean by more than this
    pub const MOTTLED_MIN_VALUE_DROP: f32 = 0.08;
    /// Hue difference that maps to severity 1
    pub const MOTTLED_HUE_SPAN: f32 = 60.0;

    /// Position weight above which a light cell counts as a sugar end
    pub const SUGAR_END_MIN_POSITION_WEIGHT: f32 = 1.2;
}

/// Color-deviation scoring scale
pub mod scoring {
    /// Attribute score meaning "exactly on target"
    pub const TARGET_SCORE: u8 = 5;

    /// USDA value considered on target
    pub const USDA_TARGET: f32 = 0.5;

    /// Agtron estimate: offset + span * luminance / 255
    pub const AGTRON_OFFSET: f64 = 20.0;
    pub const AGTRON_SPAN: f64 = 80.0;

    /// Process-color deviation thresholds (on-target, then 1..3 steps)
    pub const PROCESS_COLOR_TOLERANCE: f32 = 0.05;
    pub const PROCESS_COLOR_STEPS: [f32; 3] = [0.15, 0.25, 0.35];

    /// Mottling: count of mottled/dark regions for scores 6, 7, 8, 9
    pub const MOTTLING_COUNT_STEPS: [usize; 4] = [5, 10, 15, 20];

    /// Defect: weighted severity sum for scores 6, 7, 8, 9
    pub const DEFECT_SEVERITY_STEPS: [f32; 4] = [3.0, 6.0, 10.0, 15.0];
    /// Defect: burnt pixel ratio for scores 6, 7, 8, 9
    pub const DEFECT_BURNT_STEPS: [f32; 4] = [0.05, 0.1, 0.2, 0.3];
}

/// Fuzzy composite scoring parameters
pub mod fuzzy {
    /// Crisp outputs of the ideal / acceptable / warning / failure sets
    pub const SET_OUTPUTS: [f64; 4] = [100.0, 85.0, 60.0, 25.0];

    /// Distance from target over which the ideal set decays to zero
    pub const IDEAL_DECAY: f64 = 1.5;

    /// Attribute weights: process color, hue, mottling, defect
    pub const ATTRIBUTE_WEIGHTS: [f64; 4] = [0.30, 0.25, 0.25, 0.20];

    /// Deviation both partners must exceed before an interaction penalty applies
    pub const INTERACTION_MIN_DEVIATION: f64 = 1.0;

    pub const HUE_MOTTLING_EXPONENT: f64 = 0.7;
    pub const HUE_MOTTLING_GAIN: f64 = 3.0;
    pub const COLOR_DEFECT_EXPONENT: f64 = 0.5;
    pub const COLOR_DEFECT_GAIN: f64 = 2.0;

    /// Bonus points when every attribute is on target
    pub const ON_TARGET_BONUS: f64 = 10.0;

    /// Index forced when any attribute is at the extreme of the scale
    pub const EXTREME_OVERRIDE_INDEX: u8 = 0;
    /// Index forced when any attribute is one step from the extreme
    pub const SEVERE_OVERRIDE_INDEX: u8 = 25;
}

/// Texture estimator parameters
pub mod texture {
    /// Guards the energy ratio against an all-black image
    pub const ENERGY_EPSILON: f64 = 1e-6;

    /// Gain applied to the high-frequency energy share
    pub const CRUNCH_GAIN: f64 = 200.0;
}

/// Explainability map parameters
pub mod explain {
    /// Splat radius in grid cells
    pub const SPLAT_RADIUS: i32 = 2;
}
