//! Integration tests for the complete quality pipeline
//!
//! These tests validate the end-to-end analysis workflow on synthetic
//! images built in-test:
//! - Color space invariants
//! - White balance fallbacks
//! - Shadow suppression and the artifact flag
//! - The one-third strip-coverage rule
//! - Composite index overrides
//! - Determinism, batch processing and degenerate inputs

use fry_colorscan::calibration::WhiteBalanceEstimator;
use fry_colorscan::color::conversion::{delta_e_2000, hsv_to_rgb, rgb_to_hsv, rgb_to_lab, Hsv};
use fry_colorscan::config::WhiteBalanceConfig;
use fry_colorscan::scoring::FuzzyScorer;
use fry_colorscan::{
    analyze_batch, AttributeScores, DefectKind, ImageSample, PipelineConfig, QualityPipeline,
    RiskLevel,
};

fn rgba(hsv: Hsv) -> [u8; 4] {
    let [r, g, b] = hsv_to_rgb(hsv);
    [r, g, b, 255]
}

fn golden_fry() -> Hsv {
    Hsv::new(35.0, 0.45, 0.63)
}

fn golden_sample(width: u32, height: u32) -> ImageSample {
    ImageSample::filled(width, height, rgba(golden_fry()))
}

fn paint(sample: &mut ImageSample, x0: u32, y0: u32, size: u32, hsv: Hsv) {
    for y in y0..(y0 + size).min(sample.height()) {
        for x in x0..(x0 + size).min(sample.width()) {
            sample.put_pixel(x, y, rgba(hsv));
        }
    }
}

/// Golden tray with a burnt tip, a dark cell, a pale tip and a shadow block.
///
/// The shadow block fills one white-balance patch (40x32) exactly, so it is
/// the neutral reference and the gains stay mild.
fn busy_sample() -> ImageSample {
    let mut sample = golden_sample(200, 160);
    paint(&mut sample, 0, 60, 20, Hsv::new(20.0, 0.2, 0.1));
    paint(&mut sample, 80, 40, 20, Hsv::new(30.0, 0.6, 0.3));
    paint(&mut sample, 180, 80, 20, Hsv::new(40.0, 0.1, 0.92));
    paint(&mut sample, 80, 96, 40, Hsv::new(210.0, 0.1, 0.25));
    sample
}

fn analyze(sample: &ImageSample) -> fry_colorscan::AnalysisResult {
    QualityPipeline::new(PipelineConfig::default()).analyze(sample)
}

// ============================================================================
// Color Space Tests
// ============================================================================

#[test]
fn test_hsv_ranges_over_rgb_grid() {
    for r in (0..=255u16).step_by(15) {
        for g in (0..=255u16).step_by(15) {
            for b in (0..=255u16).step_by(15) {
                let hsv = rgb_to_hsv(r as u8, g as u8, b as u8);
                assert!((0.0..360.0).contains(&hsv.hue), "hue {:?}", hsv);
                assert!((0.0..=1.0).contains(&hsv.saturation));
                assert!((0.0..=1.0).contains(&hsv.value));
                if r == g && g == b {
                    assert_eq!(hsv.saturation, 0.0);
                    assert_eq!(hsv.hue, 0.0);
                }
            }
        }
    }
}

#[test]
fn test_delta_e_identity_and_symmetry() {
    let colors = [(161, 131, 88), (198, 148, 72), (20, 20, 20), (250, 250, 240), (90, 40, 10)];
    for &(r1, g1, b1) in &colors {
        let a = rgb_to_lab(r1, g1, b1);
        assert_eq!(delta_e_2000(a, a), 0.0);
        for &(r2, g2, b2) in &colors {
            let b = rgb_to_lab(r2, g2, b2);
            let forward = delta_e_2000(a, b);
            assert!(forward >= 0.0);
            assert!((forward - delta_e_2000(b, a)).abs() < 1e-9);
        }
    }
}

// ============================================================================
// Composite Index Tests
// ============================================================================

#[test]
fn test_extreme_scores_force_zero() {
    let scorer = FuzzyScorer::new();
    assert_eq!(scorer.quality_index(&AttributeScores::new(1, 5, 5, 5)), 0);
    assert_eq!(scorer.quality_index(&AttributeScores::new(9, 9, 9, 9)), 0);
}

#[test]
fn test_near_extreme_scores_force_25() {
    let scorer = FuzzyScorer::new();
    assert_eq!(scorer.quality_index(&AttributeScores::new(2, 5, 5, 5)), 25);
    assert_eq!(scorer.quality_index(&AttributeScores::new(5, 5, 8, 6)), 25);
}

#[test]
fn test_index_without_overrides_is_never_25_or_0() {
    let scorer = FuzzyScorer::new();
    for p in 3..=7 {
        for h in 3..=7 {
            for m in 3..=7 {
                for d in 3..=7 {
                    let index = scorer.quality_index(&AttributeScores::new(p, h, m, d));
                    assert!(index > 25 && index <= 100, "{:?} -> {}", (p, h, m, d), index);
                }
            }
        }
    }
}

// ============================================================================
// Pipeline Tests
// ============================================================================

#[test]
fn test_flat_golden_image_is_on_target() {
    let result = analyze(&golden_sample(100, 100));

    assert_eq!(result.scores, AttributeScores::new(5, 5, 5, 5));
    assert_eq!(result.quality_index, 100);
    assert_eq!(result.risk_level, RiskLevel::Low);
    assert!(result.defects.is_empty());
    assert_eq!(result.stats.pixel_count, 10_000);
    assert_eq!(result.stats.median_hue, 35.0);
    assert_eq!(result.hue_histogram().len(), 36);
    assert_eq!(result.hue_histogram()[3], 10_000);
}

#[test]
fn test_black_image_keeps_unit_gains() {
    let sample = ImageSample::filled(100, 100, [0, 0, 0, 255]);
    let gains = WhiteBalanceEstimator::new(&WhiteBalanceConfig::default()).estimate(&sample);
    assert_eq!((gains.red, gains.green, gains.blue), (1.0, 1.0, 1.0));
    assert!(!gains.applied);

    let result = analyze(&sample);
    assert_eq!(result.white_balance, gains);
}

#[test]
fn test_one_third_rule_keeps_wide_mottling() {
    let off_color = Hsv::new(80.0, 0.45, 0.5);
    let mut sample = golden_sample(100, 100);
    paint(&mut sample, 20, 40, 20, off_color);
    paint(&mut sample, 40, 40, 20, off_color);

    let result = analyze(&sample);
    let mottled: Vec<_> = result
        .defects
        .iter()
        .filter(|d| d.kind == DefectKind::Mottled)
        .collect();
    assert_eq!(mottled.len(), 2);
    for region in mottled {
        assert!((region.strip_coverage - 0.4).abs() < 1e-6);
        assert!(region.strip_coverage >= 1.0 / 3.0);
    }
}

#[test]
fn test_one_third_rule_drops_narrow_mottling() {
    let mut sample = golden_sample(100, 100);
    paint(&mut sample, 20, 40, 20, Hsv::new(80.0, 0.45, 0.5));

    let result = analyze(&sample);
    assert!(result.defects.iter().all(|d| d.kind != DefectKind::Mottled));
}

#[test]
fn test_only_shadow_regions_are_artifacts() {
    let result = analyze(&busy_sample());

    assert!(result.white_balance.applied);
    assert!(result.defects.iter().any(|d| d.kind == DefectKind::Shadow));
    assert!(result.defects.iter().any(|d| !d.is_artifact));
    for region in &result.defects {
        assert_eq!(region.is_artifact, region.kind == DefectKind::Shadow);
    }
    assert!(result.stats.shadow_suppression_ratio > 0.0);
}

#[test]
fn test_defect_regions_within_bounds() {
    // Grid does not divide the image evenly: edge cells are clipped
    let mut sample = golden_sample(110, 90);
    paint(&mut sample, 100, 80, 10, Hsv::new(20.0, 0.2, 0.1));
    let config = PipelineConfig::default().with_px_per_mm(2.0);
    let result = QualityPipeline::new(config).analyze(&sample);

    let burnt = result
        .defects
        .iter()
        .find(|d| d.kind == DefectKind::Burnt)
        .expect("burnt corner cell");
    assert_eq!((burnt.x, burnt.y, burnt.width, burnt.height), (100, 80, 10, 10));
    assert_eq!(burnt.position_weight, 1.5);
    assert_eq!(burnt.area_mm2, Some(25.0));

    for region in &result.defects {
        assert!(region.x + region.width <= 110);
        assert!(region.y + region.height <= 90);
        assert!((0.0..=1.0).contains(&region.severity));
    }
}

#[test]
fn test_explainability_follows_scored_defects() {
    let result = analyze(&busy_sample());
    assert_eq!(result.explainability.len(), 8);
    assert!(result.explainability.iter().all(|row| row.len() == 10));
    assert!(result
        .explainability
        .iter()
        .flatten()
        .all(|v| (0.0..=1.0).contains(v)));
    // Burnt tip at column 0, row 3
    assert!(result.explainability[3][0] > 0.0);
}

#[test]
fn test_pipeline_is_idempotent() {
    let sample = busy_sample();
    let pipeline = QualityPipeline::new(PipelineConfig::default());
    let first = pipeline.analyze(&sample);
    let second = pipeline.analyze(&sample);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_pipeline_leaves_input_untouched() {
    let sample = busy_sample();
    let before = sample.clone();
    let result = analyze(&sample);
    assert!(result.white_balance.applied);
    assert_eq!(sample, before);
}

#[test]
fn test_batch_matches_sequential_order() {
    let samples = vec![
        busy_sample(),
        golden_sample(100, 100),
        ImageSample::filled(30, 30, [0, 0, 0, 255]),
    ];
    let config = PipelineConfig::default();
    let batch = analyze_batch(&samples, &config);

    assert_eq!(batch.len(), samples.len());
    for (sample, result) in samples.iter().zip(&batch) {
        assert_eq!(&analyze(sample), result);
    }
}

// ============================================================================
// Degenerate Input Tests
// ============================================================================

#[test]
fn test_zero_sized_image() {
    let sample = ImageSample::new(0, 0, Vec::new()).unwrap();
    let result = analyze(&sample);
    assert_eq!(result.stats.pixel_count, 0);
    assert_eq!(result.stats.median_hue, 30.0);
    assert_eq!(result.crunch_score, 0);
    assert!(result.defects.is_empty());
    assert!(result.quality_index <= 100);
}

#[test]
fn test_fully_transparent_image() {
    let sample = ImageSample::filled(64, 64, [161, 131, 88, 0]);
    let result = analyze(&sample);
    assert_eq!(result.stats.pixel_count, 0);
    assert_eq!(result.stats.burnt_ratio, 0.0);
    assert_eq!(result.stats.median_hue, 30.0);
    assert!(result.defects.is_empty());
    assert!(result.heatmap.iter().flatten().all(|&v| v == 0.0));
}

#[test]
fn test_rejects_malformed_buffer() {
    assert!(ImageSample::new(10, 10, vec![0; 399]).is_err());
}
