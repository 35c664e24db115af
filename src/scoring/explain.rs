//! Explainability map
//!
//! A saliency grid with the same shape as the defect grid. Every scored
//! (non-artifact) defect splats `severity * position_weight` onto the cells
//! within Euclidean distance 2 of its own cell, falling off linearly as
//! `1 - d / 3`. Contributions add up and each cell is capped at 1, so the
//! result does not depend on defect order.
//!
//! Stored severities already include the position weight, so edge and tip
//! defects carry that weight twice here.

use crate::constants::explain::SPLAT_RADIUS;
use crate::detection::defects::DefectRegion;

/// Saliency per grid cell, `rows x columns`, values in [0, 1]
pub fn explainability_map(
    columns: u32,
    rows: u32,
    cell_size: u32,
    defects: &[DefectRegion],
) -> Vec<Vec<f32>> {
    let mut map = vec![vec![0.0f32; columns as usize]; rows as usize];
    let cell_size = cell_size.max(1);
    let falloff = (SPLAT_RADIUS + 1) as f32;

    for defect in defects.iter().filter(|d| !d.is_artifact) {
        let strength = defect.severity * defect.position_weight;
        let col = (defect.x / cell_size) as i64;
        let row = (defect.y / cell_size) as i64;

        for dy in -SPLAT_RADIUS..=SPLAT_RADIUS {
            for dx in -SPLAT_RADIUS..=SPLAT_RADIUS {
                let distance = ((dx * dx + dy * dy) as f32).sqrt();
                if distance > SPLAT_RADIUS as f32 {
                    continue;
                }
                let (r, c) = (row + dy as i64, col + dx as i64);
                if r < 0 || c < 0 || r >= rows as i64 || c >= columns as i64 {
                    continue;
                }
                let cell = &mut map[r as usize][c as usize];
                *cell = (*cell + strength * (1.0 - distance / falloff)).min(1.0);
            }
        }
    }

    map
}
