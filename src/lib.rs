//! # Fry ColorScan
//!
//! A Rust crate for grading fried potato strips from still photographs.
//!
//! This library turns one RGBA image into a deterministic quality record by:
//! - Normalizing the illuminant against a neutral patch in the scene
//! - Separating cast shadow from genuine surface darkening
//! - Classifying grid cells into burnt, dark, light, sugar-end and mottled defects
//! - Estimating crust crispness from local luminance contrast
//! - Scoring process color, hue, mottling and defects on the 1-9 scale
//! - Combining the scores into a fuzzy 0-100 quality index
//!
//! ## Example
//!
//! ```rust,no_run
//! use fry_colorscan::{image_loader::load_image, PipelineConfig, QualityPipeline};
//! use std::path::Path;
//!
//! let sample = load_image(Path::new("batch_17.jpg"))?;
//! let result = QualityPipeline::new(PipelineConfig::default()).analyze(&sample);
//! println!("PQI {} ({})", result.quality_index, result.risk_level);
//! # Ok::<(), fry_colorscan::AnalysisError>(())
//! ```

pub mod calibration;
pub mod color;
pub mod config;
pub mod constants;
pub mod detection;
pub mod error;
pub mod image_loader;
pub mod pipeline;
pub mod sample;
pub mod scoring;
pub mod texture;

pub use config::PipelineConfig;
pub use detection::{DefectKind, DefectRegion};
pub use error::{AnalysisError, Result};
pub use pipeline::{analyze_batch, AnalysisResult, QualityPipeline};
pub use sample::ImageSample;
pub use scoring::{AttributeScores, RiskLevel};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_result_serialization() {
        let sample = ImageSample::filled(40, 40, [161, 131, 88, 255]);
        let result = QualityPipeline::default().analyze(&sample);

        let json = serde_json::to_string(&result).unwrap();
        let deserialized: AnalysisResult = serde_json::from_str(&json).unwrap();

        assert_eq!(result, deserialized);
    }
}
