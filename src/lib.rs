pub mod config;
pub mod error;
pub mod pipeline;

pub use crate::config::Configuration;
pub use error::{ClassifierError, ConfigError, HistoryError};

pub use pipeline::services::image::analysis::{
    ClassificationRequest, RuleSet, ScoringStrategy, WasteClassifier,
};
pub use pipeline::services::{HistoryWriter, InMemoryHistory};
pub use pipeline::types::{
    Category, Classification, ClassificationRecord, ClassificationReport, ClassificationStatus,
    Distribution, FeatureVector,
};
