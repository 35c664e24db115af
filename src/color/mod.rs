//! Color analysis and conversion module
//!
//! This module handles color space conversions (HSV, CIE Lab, ΔE2000) and
//! the whole-image statistics every later stage normalizes against.

pub mod analysis;
pub mod conversion;

pub use analysis::{Baseline, ColorAnalyzer, GlobalStats};
pub use conversion::{delta_e_2000, rgb_to_hsv, rgb_to_lab, Hsv};
