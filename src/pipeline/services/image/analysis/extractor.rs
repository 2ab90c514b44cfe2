/// Feature extraction pipeline: runs every analyzer over one analysis context.
use super::analyzers::{
    ColorDiversityAnalyzer, ColorRatioAnalyzer, EdgeAnalyzer, NoiseAnalyzer, TextureAnalyzer,
};
use super::config::RuleSet;
use super::core::{AnalysisContext, FeatureAnalyzer};
use crate::pipeline::types::FeatureVector;
use std::time::Instant;
use tracing::trace;

pub struct FeatureExtractor {
    analyzers: Vec<Box<dyn FeatureAnalyzer>>,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {
            analyzers: Vec::new(),
        }
    }

    pub fn add_analyzer(mut self, analyzer: Box<dyn FeatureAnalyzer>) -> Self {
        self.analyzers.push(analyzer);
        self
    }

    /// Extract the full feature vector. Total for any decoded context.
    pub fn extract(&self, context: &AnalysisContext, rules: &RuleSet) -> FeatureVector {
        let mut features = FeatureVector::default();

        for analyzer in &self.analyzers {
            let start = Instant::now();
            analyzer.analyze(context, rules, &mut features);
            trace!(
                "{} finished in {}us",
                analyzer.name(),
                start.elapsed().as_micros()
            );
        }

        features
    }

    pub fn analyzer_names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
            .add_analyzer(Box::new(ColorRatioAnalyzer))
            .add_analyzer(Box::new(EdgeAnalyzer))
            .add_analyzer(Box::new(TextureAnalyzer))
            .add_analyzer(Box::new(NoiseAnalyzer))
            .add_analyzer(Box::new(ColorDiversityAnalyzer))
    }
}
