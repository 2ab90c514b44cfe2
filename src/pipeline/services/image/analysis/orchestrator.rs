/// Waste classifier - decodes, measures, scores and selects in a single pass.
use super::{
    config::{RuleSet, ScoringStrategy},
    core::AnalysisContext,
    extractor::FeatureExtractor,
    keywords::match_keywords,
    normalizer::{normalize, select, select_matched},
    scoring::accumulate,
};
use crate::{
    error::{ClassifierError, ConfigError},
    pipeline::types::{Classification, ClassificationReport, ClassificationStatus},
};
use image::DynamicImage;
use std::{
    future::Future,
    path::Path,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Instant,
};
use tower::Service;
use tracing::{debug, warn};

/// Classifier over an immutable rule set. Cheap to clone; clones share the rules.
#[derive(Clone)]
pub struct WasteClassifier {
    rules: Arc<RuleSet>,
    extractor: Arc<FeatureExtractor>,
    strategy: ScoringStrategy,
}

impl WasteClassifier {
    pub fn new(rules: RuleSet, strategy: ScoringStrategy) -> Result<Self, ClassifierError> {
        Self::with_shared_rules(Arc::new(rules), strategy)
    }

    pub fn with_shared_rules(
        rules: Arc<RuleSet>,
        strategy: ScoringStrategy,
    ) -> Result<Self, ClassifierError> {
        rules.validate().map_err(ConfigError::Invalid)?;

        Ok(Self {
            rules,
            extractor: Arc::new(FeatureExtractor::default()),
            strategy,
        })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn strategy(&self) -> ScoringStrategy {
        self.strategy
    }

    /// Classify encoded image bytes. Never fails: unreadable input yields the degraded sentinel.
    pub fn classify(&self, image: &[u8], description: &str) -> Classification {
        Self::soften(self.analyze(image, description))
    }

    /// Classify an image file. A missing or unreadable file is treated like a decode failure.
    pub fn classify_path(&self, path: impl AsRef<Path>, description: &str) -> Classification {
        Self::soften(self.analyze_path(path, description))
    }

    /// Full analysis of encoded image bytes, surfacing decode errors.
    pub fn analyze(
        &self,
        image: &[u8],
        description: &str,
    ) -> Result<ClassificationReport, ClassifierError> {
        let context = AnalysisContext::decode(image, self.rules.thresholds.canonical_size)?;
        Ok(self.analyze_context(&context, description))
    }

    pub fn analyze_path(
        &self,
        path: impl AsRef<Path>,
        description: &str,
    ) -> Result<ClassificationReport, ClassifierError> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).map_err(|e| ClassifierError::ReadError(e, path.to_path_buf()))?;
        self.analyze(&bytes, description)
    }

    /// Full analysis of an already decoded image.
    pub fn analyze_image(
        &self,
        image: &DynamicImage,
        description: &str,
    ) -> Result<ClassificationReport, ClassifierError> {
        let context = AnalysisContext::from_image(image, self.rules.thresholds.canonical_size)?;
        Ok(self.analyze_context(&context, description))
    }

    fn analyze_context(&self, context: &AnalysisContext, description: &str) -> ClassificationReport {
        let start = Instant::now();

        let features = self.extractor.extract(context, &self.rules);
        let matched_keywords = match_keywords(&self.rules.keywords, description);
        let scores = accumulate(&self.rules, &features, &matched_keywords, self.strategy);

        let raw = scores.total();
        let distribution = normalize(&raw);
        let most_likely = match self.strategy {
            ScoringStrategy::Weighted => select(&raw),
            ScoringStrategy::KeywordPriority => {
                select_matched(&raw, &matched_keywords).unwrap_or_else(|| select(&raw))
            }
        };

        debug!(
            "Classified as {} in {}us: raw {:?}, penalty {:.1}, distribution {:?}",
            most_likely,
            start.elapsed().as_micros(),
            raw,
            scores.penalty_factor,
            distribution
        );

        ClassificationReport {
            classification: Classification {
                most_likely,
                distribution,
                status: ClassificationStatus::Scored,
            },
            features,
            scores,
            matched_keywords,
        }
    }

    fn soften(result: Result<ClassificationReport, ClassifierError>) -> Classification {
        match result {
            Ok(report) => report.classification,
            Err(e) => {
                warn!("Classification degraded: {}", e);
                Classification::degraded()
            }
        }
    }
}

impl Default for WasteClassifier {
    fn default() -> Self {
        Self {
            rules: Arc::new(RuleSet::default()),
            extractor: Arc::new(FeatureExtractor::default()),
            strategy: ScoringStrategy::default(),
        }
    }
}

/// Encoded image plus the user's description of the item.
#[derive(Debug, Clone, Default)]
pub struct ClassificationRequest {
    pub image: Vec<u8>,
    pub description: String,
}

impl ClassificationRequest {
    pub fn new(image: Vec<u8>, description: impl Into<String>) -> Self {
        Self {
            image,
            description: description.into(),
        }
    }
}

/// Tower Service adapter for async callers. The work itself is synchronous.
impl Service<ClassificationRequest> for WasteClassifier {
    type Response = Classification;
    type Error = ClassifierError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: ClassificationRequest) -> Self::Future {
        let classification = self.classify(&request.image, &request.description);

        Box::pin(async move { Ok(classification) })
    }
}
