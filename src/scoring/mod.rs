//! Attribute scores, the fuzzy composite index and the explainability map

pub mod color;
pub mod explain;
pub mod fuzzy;

pub use color::{AttributeScores, ColorAssessment};
pub use explain::explainability_map;
pub use fuzzy::{FuzzyScorer, Membership, RiskLevel};
