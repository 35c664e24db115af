//! Shadow-aware grid segmentation and defect detection
//!
//! This module splits the corrected image into fixed-size cells, separates
//! cast shadow from genuine darkening, and classifies each cell into a
//! defect kind or leaves it clean.

pub mod defects;
pub mod grid;
pub mod shadow;

pub use defects::{DefectDetector, DefectKind, DefectRegion};
pub use grid::{CellGrid, GridCell};
pub use shadow::ShadowClassifier;
