pub mod analyzers;
pub mod config;
pub mod core;
pub mod extractor;
pub mod keywords;
pub mod normalizer;
pub mod orchestrator;
pub mod scoring;

pub use analyzers::{
    ColorDiversityAnalyzer, ColorRatioAnalyzer, EdgeAnalyzer, NoiseAnalyzer, TextureAnalyzer,
};
pub use self::config::{HsvRange, KeywordTable, Rule, RuleSet, ScoringStrategy};
pub use self::core::{AnalysisContext, FeatureAnalyzer};
pub use extractor::FeatureExtractor;
pub use orchestrator::{ClassificationRequest, WasteClassifier};
