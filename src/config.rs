use crate::error::{ClassifierError, ConfigError};
use crate::pipeline::services::image::analysis::{RuleSet, ScoringStrategy, WasteClassifier};
use ::config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

/// Runtime configuration, read from an optional `sortify.toml` and `SORTIFY_*` variables.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Configuration {
    pub strategy: ScoringStrategy,
    /// JSON rule set replacing the built-in tables.
    pub rules_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            strategy: ScoringStrategy::Weighted,
            rules_path: None,
            log_level: "info".to_string(),
        }
    }
}

impl Configuration {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("sortify")
    }

    /// Load from `<file_stem>.{toml,json,yaml,...}` if present, then the environment.
    pub fn load_from(file_stem: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(file_stem).required(false))
            .add_source(Environment::with_prefix("SORTIFY"))
            .build()?;

        let configuration: Configuration = settings.try_deserialize()?;
        configuration.validate().map_err(ConfigError::Invalid)?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), String> {
        Level::from_str(&self.log_level)
            .map_err(|_| format!("Unknown log level '{}'", self.log_level))?;
        Ok(())
    }

    pub fn log_level(&self) -> Level {
        Level::from_str(&self.log_level).unwrap_or(Level::INFO)
    }

    pub fn rule_set(&self) -> Result<RuleSet, ConfigError> {
        let Some(path) = &self.rules_path else {
            return Ok(RuleSet::default());
        };

        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::RulesReadError(e, path.clone()))?;
        let rules: RuleSet = serde_json::from_str(&text)?;
        rules.validate().map_err(ConfigError::Invalid)?;
        Ok(rules)
    }

    pub fn build_classifier(&self) -> Result<WasteClassifier, ClassifierError> {
        WasteClassifier::new(self.rule_set()?, self.strategy)
    }
}
