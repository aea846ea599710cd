//! Configuration file support
//!
//! ```toml
//! [pipeline]
//! disable_parser = true
//! keep_sets = ["Original markups"]
//! check_invariants = false
//! stage_timeout_ms = 5000
//! gazetteer = "lists/extra.toml"
//!
//! [models]
//! path = "/opt/models"
//! parser = "custom.parser.model"
//!
//! [output]
//! format = "json"
//! pretty = true
//! ```

use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;
use anyhow::Context;
use gloss_engine::ModelFiles;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Pipeline assembly
    #[serde(default)]
    pub pipeline: PipelineSection,

    /// Parser model artifacts
    #[serde(default)]
    pub models: ModelsSection,

    /// Serialization
    #[serde(default)]
    pub output: OutputSection,
}

/// `[pipeline]` section
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PipelineSection {
    /// Leave out the dependency parser
    pub disable_parser: Option<bool>,

    /// Sets annotation-delete preserves
    pub keep_sets: Option<Vec<String>>,

    /// Verify non-overlap after every stage
    #[serde(default)]
    pub check_invariants: bool,

    /// Per-stage wall-clock budget in milliseconds
    pub stage_timeout_ms: Option<u64>,

    /// Extra gazetteer lists
    pub gazetteer: Option<PathBuf>,
}

/// `[models]` section
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ModelsSection {
    /// Directory holding the artifacts
    pub path: Option<PathBuf>,
    /// Lemmatizer file name
    pub lemmatizer: Option<String>,
    /// POS tagger file name
    pub tagger: Option<String>,
    /// Parser file name
    pub parser: Option<String>,
}

impl ModelsSection {
    /// Artifact names, defaults filled in
    pub fn files(&self) -> ModelFiles {
        let defaults = ModelFiles::default();
        ModelFiles {
            lemmatizer: self.lemmatizer.clone().unwrap_or(defaults.lemmatizer),
            tagger: self.tagger.clone().unwrap_or(defaults.tagger),
            parser: self.parser.clone().unwrap_or(defaults.parser),
        }
    }
}

/// `[output]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// Default output format
    pub format: Option<OutputFormat>,

    /// Pretty print JSON output
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: None,
            pretty: default_pretty(),
        }
    }
}

fn default_pretty() -> bool {
    true
}

impl CliConfig {
    /// Read and parse a TOML configuration file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse TOML configuration text
    pub fn parse(content: &str) -> CliResult<Self> {
        toml::from_str(content).map_err(|e| CliError::ConfigError(e.message().to_string()).into())
    }
}
