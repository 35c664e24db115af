//! Illuminant normalization and spatial calibration
//!
//! White balance brings the scene illuminant back to neutral before any
//! color statistic is taken. The spatial scale is supplied from outside and
//! only converts defect areas to physical units.

pub mod scale;
pub mod white_balance;

pub use scale::SpatialScale;
pub use white_balance::{WhiteBalanceEstimator, WhiteBalanceGains};
