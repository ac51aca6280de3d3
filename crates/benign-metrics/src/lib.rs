//! Per-joke measures: structure, surprise and explanation features.

pub mod features;
pub mod structure;
pub mod surprise;

pub use features::KeywordCoder;
pub use structure::{analyze, analyze_all};
pub use surprise::SurpriseAnalyzer;
