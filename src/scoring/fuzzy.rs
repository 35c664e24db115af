//! Fuzzy composite quality index
//!
//! Each attribute score is fuzzified by its distance from target into four
//! overlapping sets (ideal, acceptable, warning, failure) and defuzzified to
//! a 0-100 value. The four values are combined with fixed weights, then two
//! interaction penalties model defects that compound each other:
//!
//! - off hue together with mottling reads as uneven frying
//! - off color together with many defects reads as a bad batch
//!
//! Scores at or next to the ends of the scale bypass the fuzzy logic
//! entirely: 1 or 9 force an index of 0, 2 or 8 force 25.

use serde::{Deserialize, Serialize};

use crate::constants::fuzzy::*;
use crate::constants::scoring::TARGET_SCORE;
use crate::scoring::color::AttributeScores;

/// Degrees of membership of one attribute score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub ideal: f64,
    pub acceptable: f64,
    pub warning: f64,
    pub failure: f64,
}

impl Membership {
    /// Fuzzify a 1-9 score by its distance from 5
    pub fn for_score(score: u8) -> Self {
        let d = deviation(score);
        Self {
            ideal: (1.0 - d / IDEAL_DECAY).max(0.0),
            acceptable: (1.0 - (d - 1.0).abs()).max(0.0),
            warning: (1.0 - (d - 2.0).abs()).max(0.0),
            failure: ((d - 2.0) / 2.0).clamp(0.0, 1.0),
        }
    }

    /// Membership-weighted mean of the set outputs
    pub fn defuzzify(&self) -> f64 {
        let degrees = [self.ideal, self.acceptable, self.warning, self.failure];
        let total: f64 = degrees.iter().sum();
        if total <= 0.0 {
            return SET_OUTPUTS[3];
        }
        degrees
            .iter()
            .zip(SET_OUTPUTS.iter())
            .map(|(m, out)| m * out)
            .sum::<f64>()
            / total
    }
}

/// Distance of a score from target
fn deviation(score: u8) -> f64 {
    (score as f64 - TARGET_SCORE as f64).abs()
}

/// Risk band of a quality index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_index(index: u8) -> Self {
        match index {
            80.. => RiskLevel::Low,
            60..=79 => RiskLevel::Moderate,
            30..=59 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite scorer over the four attribute scores
#[derive(Debug, Default, Clone, Copy)]
pub struct FuzzyScorer;

impl FuzzyScorer {
    pub fn new() -> Self {
        Self
    }

    /// Quality index in [0, 100]
    pub fn quality_index(&self, scores: &AttributeScores) -> u8 {
        let values = scores.as_array();

        if values.iter().any(|&s| s == 1 || s == 9) {
            return EXTREME_OVERRIDE_INDEX;
        }
        if values.iter().any(|&s| s == 2 || s == 8) {
            return SEVERE_OVERRIDE_INDEX;
        }

        let base: f64 = values
            .iter()
            .zip(ATTRIBUTE_WEIGHTS.iter())
            .map(|(&s, w)| w * Membership::for_score(s).defuzzify())
            .sum();

        let [color, hue, mottling, defect] = values.map(deviation);
        let mut penalty = 0.0;
        if hue > INTERACTION_MIN_DEVIATION && mottling > INTERACTION_MIN_DEVIATION {
            penalty += (hue * mottling).powf(HUE_MOTTLING_EXPONENT) * HUE_MOTTLING_GAIN;
        }
        if color > INTERACTION_MIN_DEVIATION && defect > INTERACTION_MIN_DEVIATION {
            penalty += (color * defect).powf(COLOR_DEFECT_EXPONENT) * COLOR_DEFECT_GAIN;
        }

        let on_target = values.iter().filter(|&&s| s == TARGET_SCORE).count() as f64;
        let bonus = on_target / (values.len() - 1) as f64 * ON_TARGET_BONUS;

        let index = (base - penalty + bonus).round().clamp(0.0, 100.0) as u8;
        log::debug!(
            "quality index: base {:.2}, penalty {:.2}, bonus {:.2} -> {}",
            base,
            penalty,
            bonus,
            index
        );
        index
    }
}
