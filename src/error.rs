use std::path::PathBuf;

use thiserror::Error;

// Main Classifier Error Type

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Failed to read image {1}: {0}")]
    ReadError(std::io::Error, PathBuf),
    #[error("Failed to decode image: {0}")]
    DecodeError(#[from] image::ImageError),
    #[error("Image has no pixels")]
    EmptyImage,
    #[error("Configuration Error: {0}")]
    ConfigError(#[from] ConfigError),
}

// Configuration Error Type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] ::config::ConfigError),
    #[error("Failed to read rule set {1}: {0}")]
    RulesReadError(std::io::Error, PathBuf),
    #[error("Failed to parse rule set: {0}")]
    RulesParseError(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Feedback message is empty")]
    EmptyFeedback,
}
