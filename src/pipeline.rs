//! End-to-end quality analysis
//!
//! Stages run strictly in order, each one handing an immutable snapshot to
//! the next:
//!
//! 1. white balance on a copy of the input
//! 2. baseline pass and shadow predicate
//! 3. global statistics without shadow pixels
//! 4. grid segmentation and defect detection
//! 5. crunch score on the original (not white-balanced) pixels
//! 6. attribute scores, fuzzy quality index and explainability map
//!
//! A [`QualityPipeline`] holds nothing but its configuration, so one
//! instance can serve any number of threads; [`analyze_batch`] fans a batch
//! out over rayon's pool.

use palette::Lab;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::calibration::{SpatialScale, WhiteBalanceEstimator, WhiteBalanceGains};
use crate::color::analysis::{ColorAnalyzer, GlobalStats};
use crate::color::conversion::{delta_e_2000, rgb_to_lab};
use crate::config::PipelineConfig;
use crate::constants::TARGET_GOLD_RGB;
use crate::detection::{CellGrid, DefectDetector, DefectRegion, ShadowClassifier};
use crate::sample::ImageSample;
use crate::scoring::color::{assess, AttributeScores};
use crate::scoring::explain::explainability_map;
use crate::scoring::fuzzy::{FuzzyScorer, RiskLevel};
use crate::texture::TextureEstimator;

/// Complete quality assessment of one image
///
/// The attribute scores and the quality index are the stable part of the
/// record. The hue histogram, heatmap and explainability grids may be
/// dropped by consumers and default to empty when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub width: u32,
    pub height: u32,
    pub white_balance: WhiteBalanceGains,
    pub stats: GlobalStats,
    /// Lab of the mean analysed color
    pub mean_lab: Lab,
    /// ΔE2000 between the mean analysed color and the target gold
    pub delta_e_target: f64,
    pub agtron: u8,
    pub usda: f32,
    pub scores: AttributeScores,
    /// Composite quality index, 0-100
    pub quality_index: u8,
    pub risk_level: RiskLevel,
    /// Crust crispness, 0-100
    pub crunch_score: u8,
    /// All detected regions, shadow artifacts included
    pub defects: Vec<DefectRegion>,
    /// Darkness per grid cell
    #[serde(default)]
    pub heatmap: Vec<Vec<f32>>,
    /// Defect saliency per grid cell
    #[serde(default)]
    pub explainability: Vec<Vec<f32>>,
}

impl AnalysisResult {
    /// Regions that take part in scoring
    pub fn scored_defects(&self) -> impl Iterator<Item = &DefectRegion> + '_ {
        self.defects.iter().filter(|d| !d.is_artifact)
    }

    pub fn hue_histogram(&self) -> &[u32] {
        &self.stats.hue_histogram
    }
}

/// Stateless quality analysis pipeline
#[derive(Debug, Clone, Default)]
pub struct QualityPipeline {
    config: PipelineConfig,
}

impl QualityPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Analyse one image
    ///
    /// Never fails: empty or fully transparent images produce a result built
    /// from the documented fallback values.
    pub fn analyze(&self, sample: &ImageSample) -> AnalysisResult {
        let config = &self.config;
        log::debug!("analyzing {}x{} sample", sample.width(), sample.height());

        let white_balance = WhiteBalanceEstimator::new(&config.white_balance).estimate(sample);
        let corrected = white_balance.apply(sample);

        let analyzer = ColorAnalyzer::new();
        let baseline = analyzer.baseline(&corrected);
        let shadow = ShadowClassifier::new(&baseline, &config.shadow);
        let stats = analyzer.global_stats(&corrected, &shadow);

        let grid = CellGrid::build(&corrected, &shadow, config.cell_size);
        let scale = SpatialScale::new(config.px_per_mm);
        let defects = DefectDetector::new(&config.defects).detect(&grid, &scale);

        let crunch_score = TextureEstimator::new(&config.texture).crunch_score(sample);

        let assessment = assess(&stats, &defects);
        let quality_index = FuzzyScorer::new().quality_index(&assessment.scores);

        let mean_rgb = [stats.mean_red, stats.mean_green, stats.mean_blue]
            .map(|c| c.round().clamp(0.0, 255.0) as u8);
        let mean_lab = rgb_to_lab(mean_rgb[0], mean_rgb[1], mean_rgb[2]);
        let [tr, tg, tb] = TARGET_GOLD_RGB;
        let delta_e_target = delta_e_2000(mean_lab, rgb_to_lab(tr, tg, tb));

        let explainability =
            explainability_map(grid.columns(), grid.rows(), grid.cell_size(), &defects);

        log::debug!(
            "quality index {} ({}), crunch {}, {} defects, ΔE to target {:.2}",
            quality_index,
            RiskLevel::from_index(quality_index),
            crunch_score,
            defects.len(),
            delta_e_target
        );

        AnalysisResult {
            width: sample.width(),
            height: sample.height(),
            white_balance,
            stats,
            mean_lab,
            delta_e_target,
            agtron: assessment.agtron,
            usda: assessment.usda,
            scores: assessment.scores,
            quality_index,
            risk_level: RiskLevel::from_index(quality_index),
            crunch_score,
            defects,
            heatmap: grid.heatmap(),
            explainability,
        }
    }
}

/// Analyse independent images in parallel, preserving input order
pub fn analyze_batch(samples: &[ImageSample], config: &PipelineConfig) -> Vec<AnalysisResult> {
    let pipeline = QualityPipeline::new(config.clone());
    samples
        .par_iter()
        .map(|sample| pipeline.analyze(sample))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::conversion::{hsv_to_rgb, Hsv};
    use crate::detection::DefectKind;

    fn golden(width: u32, height: u32) -> ImageSample {
        let [r, g, b] = hsv_to_rgb(Hsv::new(35.0, 0.45, 0.63));
        ImageSample::filled(width, height, [r, g, b, 255])
    }

    #[test]
    fn test_flat_golden_scores_on_target() {
        let result = QualityPipeline::default().analyze(&golden(100, 100));
        assert_eq!(result.scores, AttributeScores::new(5, 5, 5, 5));
        assert_eq!(result.quality_index, 100);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.agtron, 62);
        assert_eq!(result.usda, 0.5);
        assert!(!result.white_balance.applied);
        assert!(result.defects.is_empty());
        assert_eq!(result.crunch_score, 0);
        assert_eq!(result.heatmap.len(), 5);
        assert_eq!(result.explainability.len(), 5);
        assert!(result.delta_e_target > 0.0);
    }

    #[test]
    fn test_empty_image_does_not_panic() {
        let sample = ImageSample::new(0, 0, Vec::new()).unwrap();
        let result = QualityPipeline::default().analyze(&sample);
        assert_eq!(result.stats.pixel_count, 0);
        assert_eq!(result.stats.median_hue, 30.0);
        assert!(result.defects.is_empty());
        assert!(result.heatmap.is_empty());
        assert!(result.quality_index <= 100);
    }

    #[test]
    fn test_shadow_regions_do_not_score() {
        let mut sample = golden(100, 100);
        let [r, g, b] = hsv_to_rgb(Hsv::new(210.0, 0.1, 0.25));
        for y in 40..60 {
            for x in 40..60 {
                sample.put_pixel(x, y, [r, g, b, 255]);
            }
        }
        let result = QualityPipeline::default().analyze(&sample);
        assert_eq!(result.defects.len(), 1);
        assert_eq!(result.defects[0].kind, DefectKind::Shadow);
        assert_eq!(result.scored_defects().count(), 0);
        assert_eq!(result.stats.shadow_pixel_count, 400);
        assert_eq!(result.scores, AttributeScores::new(5, 5, 5, 5));
    }

    #[test]
    fn test_batch_matches_sequential() {
        let samples = vec![golden(40, 40), golden(60, 20), ImageSample::filled(10, 10, [0, 0, 0, 255])];
        let config = PipelineConfig::default();
        let batch = analyze_batch(&samples, &config);
        let pipeline = QualityPipeline::new(config);
        assert_eq!(batch.len(), 3);
        for (sample, result) in samples.iter().zip(&batch) {
            assert_eq!(&pipeline.analyze(sample), result);
        }
    }

    #[test]
    fn test_optional_grids_default_when_missing() {
        let result = QualityPipeline::default().analyze(&golden(40, 40));
        let mut value = serde_json::to_value(&result).unwrap();
        let object = value.as_object_mut().unwrap();
        object.remove("heatmap");
        object.remove("explainability");
        object["stats"].as_object_mut().unwrap().remove("hue_histogram");

        let parsed: AnalysisResult = serde_json::from_value(value).unwrap();
        assert!(parsed.heatmap.is_empty());
        assert!(parsed.explainability.is_empty());
        assert!(parsed.hue_histogram().is_empty());
        assert_eq!(parsed.scores, result.scores);
        assert_eq!(parsed.quality_index, result.quality_index);
    }
}
