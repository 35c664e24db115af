//! Fixed-size grid segmentation
//!
//! The corrected image is cut into square cells (the last row/column clipped
//! to the image). Each cell aggregates its qualifying pixels in one pass:
//! how many there are, how many of them are cast shadow, and the mean HSV
//! of the remaining ones. Cells are rebuilt for every analysis.

use serde::{Deserialize, Serialize};

use crate::color::analysis::qualifying_hsv;
use crate::detection::shadow::ShadowClassifier;
use crate::sample::ImageSample;

/// One grid cell with its aggregate color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub col: u32,
    pub row: u32,
    /// Pixel rectangle, clipped to the image
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Pixels with alpha >= 128 outside the background band
    pub qualifying_pixels: usize,
    /// Qualifying pixels classified as cast shadow
    pub shadow_pixels: usize,
    /// Mean HSV over the non-shadow qualifying pixels
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
    /// More than the configured fraction of the cell is cast shadow
    pub is_shadow: bool,
}

impl GridCell {
    /// At least one qualifying pixel
    pub fn has_fry_content(&self) -> bool {
        self.qualifying_pixels > 0
    }

    /// Fraction of the qualifying pixels that are shadow
    pub fn shadow_fraction(&self) -> f32 {
        self.shadow_pixels as f32 / self.qualifying_pixels.max(1) as f32
    }

    pub fn area_px(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

#[derive(Default, Clone, Copy)]
struct CellAccumulator {
    qualifying: usize,
    shadow: usize,
    sum_h: f64,
    sum_s: f64,
    sum_v: f64,
}

/// Row-major grid of cells covering the whole image
#[derive(Debug, Clone, PartialEq)]
pub struct CellGrid {
    columns: u32,
    rows: u32,
    cell_size: u32,
    image_width: u32,
    image_height: u32,
    cells: Vec<GridCell>,
}

impl CellGrid {
    /// Segment `sample` into `cell_size` cells
    ///
    /// A cell size of 0 is treated as 1.
    pub fn build(sample: &ImageSample, shadow: &ShadowClassifier, cell_size: u32) -> Self {
        let cell_size = cell_size.max(1);
        let (width, height) = (sample.width(), sample.height());
        let columns = width.div_ceil(cell_size);
        let rows = height.div_ceil(cell_size);

        let mut acc = vec![CellAccumulator::default(); (columns * rows) as usize];
        for y in 0..height {
            let row_base = (y / cell_size) * columns;
            for x in 0..width {
                let Some(hsv) = qualifying_hsv(sample.pixel(x, y)) else {
                    continue;
                };
                let cell = &mut acc[(row_base + x / cell_size) as usize];
                cell.qualifying += 1;
                if shadow.is_shadow(&hsv) {
                    cell.shadow += 1;
                } else {
                    cell.sum_h += hsv.hue as f64;
                    cell.sum_s += hsv.saturation as f64;
                    cell.sum_v += hsv.value as f64;
                }
            }
        }

        let cells = acc
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let col = i as u32 % columns;
                let row = i as u32 / columns;
                let x = col * cell_size;
                let y = row * cell_size;
                let lit = (a.qualifying - a.shadow).max(1) as f64;
                GridCell {
                    col,
                    row,
                    x,
                    y,
                    width: cell_size.min(width - x),
                    height: cell_size.min(height - y),
                    qualifying_pixels: a.qualifying,
                    shadow_pixels: a.shadow,
                    hue: (a.sum_h / lit) as f32,
                    saturation: (a.sum_s / lit) as f32,
                    value: (a.sum_v / lit) as f32,
                    is_shadow: shadow.is_shadow_cell(a.shadow, a.qualifying),
                }
            })
            .collect();

        log::debug!(
            "grid: {}x{} cells of {} px over {}x{}",
            columns,
            rows,
            cell_size,
            width,
            height
        );

        Self {
            columns,
            rows,
            cell_size,
            image_width: width,
            image_height: height,
            cells,
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cell(&self, col: u32, row: u32) -> Option<&GridCell> {
        if col < self.columns && row < self.rows {
            self.cells.get((row * self.columns + col) as usize)
        } else {
            None
        }
    }

    /// Cells with fry content that are not whole-cell shadow
    pub fn fry_cells(&self) -> impl Iterator<Item = &GridCell> + '_ {
        self.cells
            .iter()
            .filter(|c| c.has_fry_content() && !c.is_shadow)
    }

    /// Mean hue and value over the non-shadow fry cells, `(0, 0)` if none
    pub fn mean_hue_value(&self) -> (f32, f32) {
        let (n, sum_h, sum_v) = self.fry_cells().fold((0usize, 0.0f64, 0.0f64), |acc, c| {
            (acc.0 + 1, acc.1 + c.hue as f64, acc.2 + c.value as f64)
        });
        let n = n.max(1) as f64;
        ((sum_h / n) as f32, (sum_v / n) as f32)
    }

    /// Darkness (`1 - mean value`) per cell, zero for background and shadow
    pub fn heatmap(&self) -> Vec<Vec<f32>> {
        self.cells
            .chunks(self.columns.max(1) as usize)
            .map(|row| {
                row.iter()
                    .map(|c| {
                        if c.has_fry_content() && !c.is_shadow {
                            1.0 - c.value
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect()
    }
}
