//! Configuration types for pipeline assembly

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration constants
pub mod defaults {
    /// Lemmatizer model file name
    pub const LEMMATIZER_MODEL: &str = "CoNLL2009-ST-English-ALL.anna-3.3.lemmatizer.model";

    /// POS tagger model file name
    pub const TAGGER_MODEL: &str = "CoNLL2009-ST-English-ALL.anna-3.3.postagger.model";

    /// Dependency parser model file name
    pub const PARSER_MODEL: &str = "CoNLL2009-ST-English-ALL.anna-3.3.parser.model";

    /// Set preserved by the annotation-delete stage
    pub const KEPT_SET: &str = "Original markups";
}

/// File names of the three parser model artifacts, relative to the models path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelFiles {
    /// Lemmatizer model
    pub lemmatizer: String,
    /// POS tagger model
    pub tagger: String,
    /// Dependency parser model
    pub parser: String,
}

impl Default for ModelFiles {
    fn default() -> Self {
        Self {
            lemmatizer: defaults::LEMMATIZER_MODEL.to_string(),
            tagger: defaults::TAGGER_MODEL.to_string(),
            parser: defaults::PARSER_MODEL.to_string(),
        }
    }
}

impl ModelFiles {
    /// Absolute paths under `base`, in lemmatizer, tagger, parser order
    pub fn resolve(&self, base: &Path) -> [PathBuf; 3] {
        [
            base.join(&self.lemmatizer),
            base.join(&self.tagger),
            base.join(&self.parser),
        ]
    }
}

/// Pipeline assembly configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Include the dependency-parsing stage
    pub enable_parser: bool,
    /// Directory holding the model artifacts
    pub models_path: Option<PathBuf>,
    /// Model artifact names
    pub model_files: ModelFiles,
    /// Sets the annotation-delete stage leaves alone
    pub keep_sets: Vec<String>,
    /// Extra gazetteer lists (TOML)
    pub gazetteer_lists: Option<PathBuf>,
    /// Verify the non-overlap invariant after every stage
    pub check_invariants: bool,
    /// Wall-clock budget per stage
    pub stage_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            enable_parser: false,
            models_path: None,
            model_files: ModelFiles::default(),
            keep_sets: vec![defaults::KEPT_SET.to_string()],
            gazetteer_lists: None,
            check_invariants: false,
            stage_timeout: None,
        }
    }
}

impl PipelineConfig {
    /// Create a configuration builder
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.enable_parser && self.models_path.is_none() {
            return Err(PipelineError::Configuration(
                "a models path is required unless the parser is disabled".into(),
            ));
        }

        if let Some(timeout) = self.stage_timeout {
            if timeout.is_zero() {
                return Err(PipelineError::Configuration(
                    "stage timeout must be greater than 0".into(),
                ));
            }
        }

        Ok(())
    }
}

/// Fluent builder for [`PipelineConfig`]
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Create a builder holding the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the dependency parser with models under `path`
    pub fn parser(mut self, models_path: impl Into<PathBuf>) -> Self {
        self.config.enable_parser = true;
        self.config.models_path = Some(models_path.into());
        self
    }

    /// Toggle the dependency parser
    pub fn enable_parser(mut self, enabled: bool) -> Self {
        self.config.enable_parser = enabled;
        self
    }

    /// Set the models directory without changing the parser toggle
    pub fn models_path(mut self, path: Option<PathBuf>) -> Self {
        self.config.models_path = path;
        self
    }

    /// Override the model artifact names
    pub fn model_files(mut self, files: ModelFiles) -> Self {
        self.config.model_files = files;
        self
    }

    /// Sets preserved by annotation-delete
    pub fn keep_sets<I, S>(mut self, sets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.keep_sets = sets.into_iter().map(Into::into).collect();
        self
    }

    /// Extra gazetteer lists
    pub fn gazetteer_lists(mut self, path: Option<PathBuf>) -> Self {
        self.config.gazetteer_lists = path;
        self
    }

    /// Verify invariants after every stage
    pub fn check_invariants(mut self, enabled: bool) -> Self {
        self.config.check_invariants = enabled;
        self
    }

    /// Per-stage wall-clock budget
    pub fn stage_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.stage_timeout = timeout;
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert!(!config.enable_parser);
        assert_eq!(config.keep_sets, vec!["Original markups".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parser_requires_models_path() {
        let result = PipelineConfig::builder().enable_parser(true).build();
        assert!(matches!(result, Err(PipelineError::Configuration(_))));

        let config = PipelineConfig::builder().parser("/models").build().unwrap();
        assert!(config.enable_parser);
        assert_eq!(config.models_path, Some(PathBuf::from("/models")));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = PipelineConfig::builder()
            .stage_timeout(Some(Duration::ZERO))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_model_files_resolve() {
        let [lemma, tagger, parser] = ModelFiles::default().resolve(Path::new("/m"));
        assert_eq!(
            lemma,
            PathBuf::from("/m/CoNLL2009-ST-English-ALL.anna-3.3.lemmatizer.model")
        );
        assert!(tagger.ends_with("CoNLL2009-ST-English-ALL.anna-3.3.postagger.model"));
        assert!(parser.ends_with("CoNLL2009-ST-English-ALL.anna-3.3.parser.model"));
    }
}
