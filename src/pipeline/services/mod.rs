pub mod history_journal;
pub mod image;

pub use history_journal::{HistoryWriter, InMemoryHistory};
pub use image::{ClassificationRequest, RuleSet, ScoringStrategy, WasteClassifier};
