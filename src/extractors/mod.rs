// src/extractors/mod.rs
pub mod chart;
pub mod document;
pub mod fallback;
pub mod fields;
pub mod models;
pub mod tags;

// Re-export key extraction types for convenience
pub use chart::{derive_chart, document_chart, ChartSlice};
pub use document::{parse, parse_with, DocumentExtractor};
pub use fallback::{Fallbacks, FixedFallbacks, SeededFallbacks, TUTORIAL_CATEGORIES};
pub use models::{
    BasicInfo, DataVisualization, Discussion, HeatLevel, ParsedDocument, Quote, RankEntry,
    Tutorial,
};
