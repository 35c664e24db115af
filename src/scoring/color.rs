//! Color-deviation attribute scores
//!
//! Maps the global statistics and the defect catalog onto four 1-9
//! attribute scores. 5 is exactly on target; scores move toward 1 when the
//! sample is under target (too pale for process color) and toward 9 when it
//! is over.
//!
//! The process color goes through two industry scales: an Agtron estimate
//! from the mean luminance, then the USDA fry color step function whose
//! on-target value is 0.5 (Agtron 58-68).

use serde::{Deserialize, Serialize};

use crate::color::analysis::GlobalStats;
use crate::color::conversion::luminance;
use crate::constants::scoring::*;
use crate::detection::defects::DefectRegion;

/// The four attribute scores on the 1-9 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeScores {
    pub process_color: u8,
    pub hue: u8,
    pub mottling: u8,
    pub defect: u8,
}

impl AttributeScores {
    pub fn new(process_color: u8, hue: u8, mottling: u8, defect: u8) -> Self {
        Self {
            process_color,
            hue,
            mottling,
            defect,
        }
    }

    /// Scores in weighting order: process color, hue, mottling, defect
    pub fn as_array(&self) -> [u8; 4] {
        [self.process_color, self.hue, self.mottling, self.defect]
    }

    pub fn all_on_target(&self) -> bool {
        self.as_array().iter().all(|&s| s == TARGET_SCORE)
    }
}

/// Agtron and USDA readings plus the attribute scores derived from them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorAssessment {
    pub agtron: u8,
    pub usda: f32,
    pub scores: AttributeScores,
}

/// Agtron estimate from a mean RGB color: `round(20 + 80 * luma / 255)`
pub fn agtron_estimate(mean_rgb: [f64; 3]) -> u8 {
    let luma = luminance(mean_rgb[0], mean_rgb[1], mean_rgb[2]);
    (AGTRON_OFFSET + AGTRON_SPAN * luma / 255.0)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// USDA fry color value of an Agtron reading
pub fn usda_from_agtron(agtron: u8) -> f32 {
    match agtron {
        85.. => 1.0,
        78..=84 => 0.8,
        69..=77 => 0.6,
        58..=68 => 0.5,
        48..=57 => 0.4,
        38..=47 => 0.2,
        _ => 0.0,
    }
}

/// Process color score: steps away from 5 by USDA deviation, down when darker
pub fn process_color_score(usda: f32) -> u8 {
    let deviation = (usda - USDA_TARGET).abs();
    if deviation < PROCESS_COLOR_TOLERANCE {
        return TARGET_SCORE;
    }
    let steps = PROCESS_COLOR_STEPS
        .iter()
        .position(|&limit| deviation < limit)
        .map_or(4, |i| i as u8 + 1);
    if usda < USDA_TARGET {
        TARGET_SCORE - steps
    } else {
        TARGET_SCORE + steps
    }
}

/// Hue score from the median hue (degrees) and mean saturation
pub fn hue_score(hue: f32, saturation: f32) -> u8 {
    match hue {
        h if (25.0..=40.0).contains(&h) => {
            if saturation < 0.3 {
                6
            } else if saturation > 0.6 {
                4
            } else {
                5
            }
        }
        h if h > 55.0 => 9,
        h if h > 50.0 => 8,
        h if h > 45.0 => 7,
        h if h > 40.0 => 6,
        h if h >= 20.0 => 4,
        _ => 3,
    }
}

/// Mottling score from the number of mottled and dark regions
pub fn mottling_score(defects: &[DefectRegion]) -> u8 {
    let count = defects
        .iter()
        .filter(|d| !d.is_artifact && d.kind.counts_as_mottling())
        .count();
    TARGET_SCORE + MOTTLING_COUNT_STEPS.iter().filter(|&&n| count >= n).count() as u8
}

/// Defect score from the weighted severity sum and the burnt pixel ratio
pub fn defect_score(defects: &[DefectRegion], burnt_ratio: f32) -> u8 {
    let weighted: f32 = defects
        .iter()
        .filter(|d| !d.is_artifact)
        .map(|d| d.severity)
        .sum();
    let level = DEFECT_SEVERITY_STEPS
        .iter()
        .zip(DEFECT_BURNT_STEPS.iter())
        .rposition(|(&severity, &burnt)| weighted > severity || burnt_ratio > burnt)
        .map_or(0, |i| i as u8 + 1);
    TARGET_SCORE + level
}

/// Score all four attributes
pub fn assess(stats: &GlobalStats, defects: &[DefectRegion]) -> ColorAssessment {
    let agtron = agtron_estimate([stats.mean_red, stats.mean_green, stats.mean_blue]);
    let usda = usda_from_agtron(agtron);
    let scores = AttributeScores {
        process_color: process_color_score(usda),
        hue: hue_score(stats.median_hue, stats.mean_saturation),
        mottling: mottling_score(defects),
        defect: defect_score(defects, stats.burnt_ratio),
    };
    log::debug!("agtron {} usda {:.1} scores {:?}", agtron, usda, scores.as_array());
    ColorAssessment {
        agtron,
        usda,
        scores,
    }
}
