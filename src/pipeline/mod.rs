pub mod services;
pub mod types;

pub use services::{HistoryWriter, InMemoryHistory, WasteClassifier};
pub use types::{Category, Classification, ClassificationReport, Distribution, FeatureVector};
