//! Configuration structures for the fry_colorscan analysis pipeline.
//!
//! This module defines the tunable parameters for quality analysis,
//! organized into logical groups for white balance, shadow suppression,
//! defect detection and texture estimation.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use fry_colorscan::PipelineConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = PipelineConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = PipelineConfig::default();
//! # Ok::<(), fry_colorscan::AnalysisError>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`WhiteBalanceConfig`]: neutral reference search and gain application
//! - [`ShadowConfig`]: cast-shadow predicate and whole-cell shadow rule
//! - [`DefectConfig`]: severity floor, edge emphasis and strip coverage
//! - [`TextureConfig`]: crispness patch size

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AnalysisError, Result};

/// Complete pipeline configuration for quality analysis.
///
/// Contains all parameters needed to process a sample image into an
/// [`AnalysisResult`](crate::AnalysisResult). Can be serialized to/from JSON
/// for reproducible grading runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Side length of a grid cell in pixels
    pub cell_size: u32,

    /// Pixels per millimeter, supplied by an external calibration step.
    /// `None` reports defect areas in pixels only.
    #[serde(default)]
    pub px_per_mm: Option<f64>,

    /// White balance normalization settings
    pub white_balance: WhiteBalanceConfig,

    /// Shadow suppression settings
    pub shadow: ShadowConfig,

    /// Defect detection settings
    pub defects: DefectConfig,

    /// Texture estimator settings
    pub texture: TextureConfig,
}

/// White balance normalization parameters.
///
/// The image is tiled into `grid_divisions²` patches; the brightest patch
/// whose channel means lie close together serves as the neutral reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhiteBalanceConfig {
    /// Enable white balance correction
    pub enabled: bool,

    /// Patches per image side
    pub grid_divisions: u32,

    /// Maximum difference between any two channel means (0-255) of a neutral patch
    pub max_channel_spread: f64,

    /// Minimum BT.601 luminance (0-255) of a trusted reference patch
    pub min_luminance: f64,
}

/// Cast-shadow classification parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowConfig {
    /// Minimum relative darkening against the baseline mean value (0.0-1.0)
    pub min_relative_darkening: f32,

    /// Shadow saturation must stay below this fraction of the baseline mean
    pub max_saturation_ratio: f32,

    /// Lower bound of the golden-brown hue band (degrees)
    pub golden_hue_min: f32,

    /// Upper bound of the golden-brown hue band (degrees)
    pub golden_hue_max: f32,

    /// Fraction of shadow pixels above which a whole cell is a shadow
    pub cell_shadow_fraction: f32,
}

/// Defect detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectConfig {
    /// Severity at or below which a cell is not reported
    pub min_severity: f32,

    /// Fraction of the grid treated as the edge/tip zone on every side
    pub edge_margin: f32,

    /// Position weight of cells in the edge/tip zone
    pub edge_position_weight: f32,

    /// Height of a row band in pixels for the strip-coverage rule
    pub band_height: u32,

    /// Minimum fraction of the image width a band's defects must cover
    /// for mottled regions in that band to be kept
    pub min_strip_coverage: f32,
}

/// Texture estimator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureConfig {
    /// Side length of a luminance patch in pixels
    pub patch_size: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cell_size: 20,
            px_per_mm: None,
            white_balance: WhiteBalanceConfig::default(),
            shadow: ShadowConfig::default(),
            defects: DefectConfig::default(),
            texture: TextureConfig::default(),
        }
    }
}

impl Default for WhiteBalanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            grid_divisions: 5,
            max_channel_spread: 40.0,
            min_luminance: 30.0,
        }
    }
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            min_relative_darkening: 0.35,
            max_saturation_ratio: 0.65,
            golden_hue_min: 15.0,
            golden_hue_max: 55.0,
            cell_shadow_fraction: 0.5,
        }
    }
}

impl Default for DefectConfig {
    fn default() -> Self {
        Self {
            min_severity: 0.15,
            edge_margin: 0.1,
            edge_position_weight: 1.5,
            band_height: 30,
            min_strip_coverage: 1.0 / 3.0,
        }
    }
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self { patch_size: 8 }
    }
}

impl PipelineConfig {
    /// Builder-style override of the grid cell size
    pub fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Builder-style override of the spatial calibration
    pub fn with_px_per_mm(mut self, px_per_mm: f64) -> Self {
        self.px_per_mm = Some(px_per_mm);
        self
    }

    /// Check that every parameter is usable
    pub fn validate(&self) -> Result<()> {
        if self.cell_size == 0 {
            return Err(AnalysisError::invalid_parameter("cell_size", self.cell_size));
        }
        if let Some(ratio) = self.px_per_mm {
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(AnalysisError::invalid_parameter("px_per_mm", ratio));
            }
        }
        if self.white_balance.grid_divisions == 0 {
            return Err(AnalysisError::invalid_parameter(
                "white_balance.grid_divisions",
                self.white_balance.grid_divisions,
            ));
        }
        if self.texture.patch_size == 0 {
            return Err(AnalysisError::invalid_parameter(
                "texture.patch_size",
                self.texture.patch_size,
            ));
        }
        if self.defects.band_height == 0 {
            return Err(AnalysisError::invalid_parameter(
                "defects.band_height",
                self.defects.band_height,
            ));
        }

        let fractions = [
            ("shadow.min_relative_darkening", self.shadow.min_relative_darkening),
            ("shadow.max_saturation_ratio", self.shadow.max_saturation_ratio),
            ("shadow.cell_shadow_fraction", self.shadow.cell_shadow_fraction),
            ("defects.min_severity", self.defects.min_severity),
            ("defects.edge_margin", self.defects.edge_margin),
            ("defects.min_strip_coverage", self.defects.min_strip_coverage),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(AnalysisError::invalid_parameter(name, value));
            }
        }

        if self.shadow.golden_hue_min > self.shadow.golden_hue_max {
            return Err(AnalysisError::invalid_parameter(
                "shadow.golden_hue_min",
                format!(
                    "{} (above golden_hue_max {})",
                    self.shadow.golden_hue_min, self.shadow.golden_hue_max
                ),
            ));
        }

        Ok(())
    }

    /// Load and validate configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::config(format!("Failed to read {}", path.display()), e)
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            AnalysisError::config(format!("Failed to parse {}", path.display()), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AnalysisError::config("Failed to serialize configuration", e))?;
        std::fs::write(path, json).map_err(|e| {
            AnalysisError::config(format!("Failed to write {}", path.display()), e)
        })?;
        Ok(())
    }
}
