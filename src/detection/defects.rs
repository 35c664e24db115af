//! Cell-level defect classification and the strip-coverage rule
//!
//! Every fry cell of the [`CellGrid`] is matched against the defect rules in
//! priority order (burnt, dark, light/sugar end, mottled); the first match
//! wins. Whole-cell shadows become `Shadow` regions that are kept for display
//! but flagged as artifacts and ignored by every score.
//!
//! After classification the regions are grouped into horizontal row bands.
//! A mottled region only survives when the defects of its band span at
//! least a third of the image width (the "one-third rule"), so an isolated
//! off-color spot on a strip does not count as mottling.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::calibration::scale::SpatialScale;
use crate::config::DefectConfig;
use crate::constants::defect_rules::*;
use crate::detection::grid::{CellGrid, GridCell};

/// Closed set of defect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectKind {
    Dark,
    Burnt,
    Light,
    Mottled,
    SugarEnd,
    Disease,
    Shadow,
}

impl DefectKind {
    /// Artifacts are displayed but excluded from scoring
    pub fn is_artifact(self) -> bool {
        match self {
            DefectKind::Shadow => true,
            DefectKind::Dark
            | DefectKind::Burnt
            | DefectKind::Light
            | DefectKind::Mottled
            | DefectKind::SugarEnd
            | DefectKind::Disease => false,
        }
    }

    /// Kinds counted by the mottling attribute
    pub fn counts_as_mottling(self) -> bool {
        match self {
            DefectKind::Mottled | DefectKind::Dark => true,
            DefectKind::Burnt
            | DefectKind::Light
            | DefectKind::SugarEnd
            | DefectKind::Disease
            | DefectKind::Shadow => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DefectKind::Dark => "dark",
            DefectKind::Burnt => "burnt",
            DefectKind::Light => "light",
            DefectKind::Mottled => "mottled",
            DefectKind::SugarEnd => "sugar_end",
            DefectKind::Disease => "disease",
            DefectKind::Shadow => "shadow",
        }
    }
}

impl std::fmt::Display for DefectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A localized surface defect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectRegion {
    pub kind: DefectKind,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position-weighted severity in [0, 1]
    pub severity: f32,
    pub area_px: u64,
    /// Physical area, only when a spatial calibration is configured
    pub area_mm2: Option<f64>,
    /// Fraction of the image width covered by the defects of this row band
    pub strip_coverage: f32,
    pub position_weight: f32,
    pub is_artifact: bool,
}

impl DefectRegion {
    /// Create a region inside a `bounds` (width, height) image
    ///
    /// The rectangle is clamped into the image and the severity into
    /// [0, 1]. Only `Shadow` regions are artifacts.
    pub fn new(
        kind: DefectKind,
        rect: (u32, u32, u32, u32),
        severity: f32,
        position_weight: f32,
        bounds: (u32, u32),
    ) -> Self {
        let (x, y, width, height) = rect;
        let x = x.min(bounds.0);
        let y = y.min(bounds.1);
        let width = width.min(bounds.0 - x);
        let height = height.min(bounds.1 - y);
        let severity = if severity.is_nan() {
            0.0
        } else {
            severity.clamp(0.0, 1.0)
        };

        Self {
            kind,
            x,
            y,
            width,
            height,
            severity,
            area_px: width as u64 * height as u64,
            area_mm2: None,
            strip_coverage: 0.0,
            position_weight,
            is_artifact: kind.is_artifact(),
        }
    }

    /// Fill in the physical area from a calibration
    pub fn with_scale(mut self, scale: &SpatialScale) -> Self {
        self.area_mm2 = scale.area_mm2(self.area_px);
        self
    }
}

/// Position weight of a cell: edge/tip cells weigh more than the body
pub fn position_weight(col: u32, row: u32, columns: u32, rows: u32, config: &DefectConfig) -> f32 {
    let in_margin = |i: u32, n: u32| {
        let (i, n) = (i as f32, n as f32);
        i < config.edge_margin * n || i + 1.0 > (1.0 - config.edge_margin) * n
    };
    if in_margin(col, columns) || in_margin(row, rows) {
        config.edge_position_weight
    } else {
        1.0
    }
}

/// Apply the one-third rule
///
/// Non-artifact regions are grouped by `floor(y / band_height)`; the summed
/// width of a band's regions over `image_width` is its coverage, recorded on
/// every non-artifact region of the band. Mottled regions in bands below
/// `min_coverage` are dropped. Artifacts pass through with coverage 0.
pub fn apply_strip_coverage(
    regions: Vec<DefectRegion>,
    image_width: u32,
    band_height: u32,
    min_coverage: f32,
) -> Vec<DefectRegion> {
    let band_height = band_height.max(1);
    let image_width = image_width.max(1) as f32;

    let mut band_widths: HashMap<u32, u64> = HashMap::new();
    for region in regions.iter().filter(|r| !r.is_artifact) {
        *band_widths.entry(region.y / band_height).or_default() += region.width as u64;
    }

    regions
        .into_iter()
        .filter_map(|mut region| {
            if region.is_artifact {
                region.strip_coverage = 0.0;
                return Some(region);
            }
            let width = band_widths
                .get(&(region.y / band_height))
                .copied()
                .unwrap_or(0);
            region.strip_coverage = width as f32 / image_width;
            if region.kind == DefectKind::Mottled && region.strip_coverage < min_coverage {
                log::debug!(
                    "dropping mottled region at ({}, {}): band coverage {:.2}",
                    region.x,
                    region.y,
                    region.strip_coverage
                );
                None
            } else {
                Some(region)
            }
        })
        .collect()
}

/// Grid-based defect detector
#[derive(Debug, Clone)]
pub struct DefectDetector {
    config: DefectConfig,
}

impl Default for DefectDetector {
    fn default() -> Self {
        Self::new(&DefectConfig::default())
    }
}

impl DefectDetector {
    pub fn new(config: &DefectConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Classify every cell of `grid` and apply the strip-coverage rule
    pub fn detect(&self, grid: &CellGrid, scale: &SpatialScale) -> Vec<DefectRegion> {
        let bounds = (grid.image_width(), grid.image_height());
        let (mean_hue, mean_value) = grid.mean_hue_value();
        let mut regions = Vec::new();

        for cell in grid.cells().iter().filter(|c| c.has_fry_content()) {
            let rect = (cell.x, cell.y, cell.width, cell.height);

            if cell.is_shadow {
                regions.push(
                    DefectRegion::new(DefectKind::Shadow, rect, cell.shadow_fraction(), 1.0, bounds)
                        .with_scale(scale),
                );
                continue;
            }

            let Some((kind, severity)) = classify_cell(cell, mean_hue, mean_value) else {
                continue;
            };
            if severity <= self.config.min_severity {
                continue;
            }

            let weight = position_weight(cell.col, cell.row, grid.columns(), grid.rows(), &self.config);
            let kind = match kind {
                DefectKind::Light if weight > SUGAR_END_MIN_POSITION_WEIGHT => DefectKind::SugarEnd,
                other => other,
            };
            regions.push(
                DefectRegion::new(kind, rect, severity * weight, weight, bounds).with_scale(scale),
            );
        }

        let regions = apply_strip_coverage(
            regions,
            grid.image_width(),
            self.config.band_height,
            self.config.min_strip_coverage,
        );

        log::debug!(
            "defects: {} regions ({} artifacts), grid mean hue {:.1} value {:.3}",
            regions.len(),
            regions.iter().filter(|r| r.is_artifact).count(),
            mean_hue,
            mean_value
        );

        regions
    }
}

/// First matching rule for a non-shadow fry cell, with its raw severity
fn classify_cell(cell: &GridCell, mean_hue: f32, mean_value: f32) -> Option<(DefectKind, f32)> {
    let value_drop = mean_value - cell.value;

    if cell.value < BURNT_MAX_VALUE && cell.saturation < BURNT_MAX_SATURATION {
        return Some((DefectKind::Burnt, 1.0 - cell.value));
    }
    if value_drop > DARK_MIN_VALUE_DROP && cell.saturation > DARK_MIN_SATURATION {
        return Some((DefectKind::Dark, value_drop));
    }
    if cell.value > LIGHT_MIN_VALUE && cell.saturation < LIGHT_MAX_SATURATION {
        return Some((
            DefectKind::Light,
            (cell.value - LIGHT_MIN_VALUE) * LIGHT_SEVERITY_GAIN,
        ));
    }
    let hue_diff = (mean_hue - cell.hue).abs();
    if hue_diff > MOTTLED_MIN_HUE_DIFF && value_drop > MOTTLED_MIN_VALUE_DROP {
        return Some((DefectKind::Mottled, hue_diff / MOTTLED_HUE_SPAN));
    }
    None
}
