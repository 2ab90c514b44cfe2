pub mod analysis;

pub use analysis::{ClassificationRequest, RuleSet, ScoringStrategy, WasteClassifier};
