//! Layered error types
//!
//! Assembly errors are fatal and surface before any document is touched.
//! Document errors are per-document and never abort a batch.

use gloss_core::{Layer, StageError};
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline assembly and configuration errors
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage requires layers no earlier stage produces
    #[error("stage '{stage}' requires {} which no earlier stage produces", format_layers(.missing))]
    Assembly {
        /// Stage whose requirements are unmet
        stage: String,
        /// Layers nobody upstream produces
        missing: Vec<Layer>,
    },

    /// Two stages share a name
    #[error("stage '{0}' appears more than once")]
    DuplicateStage(String),

    /// A model artifact could not be loaded
    #[error("failed to load model {}: {reason}", .path.display())]
    ModelLoad {
        /// Artifact path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl PipelineError {
    /// Layers reported missing, empty for other variants
    pub fn missing_layers(&self) -> &[Layer] {
        match self {
            PipelineError::Assembly { missing, .. } => missing,
            _ => &[],
        }
    }
}

fn format_layers(layers: &[Layer]) -> String {
    layers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure loading a single input document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The source could not be read
    #[error("cannot read document '{document}': {source}")]
    Io {
        /// Document identity
        document: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not valid in the configured encoding
    #[error("document '{document}' is not valid {encoding}")]
    Decode {
        /// Document identity
        document: String,
        /// Encoding label
        encoding: String,
    },

    /// The encoding label is not recognised
    #[error("unknown encoding '{0}'")]
    UnknownEncoding(String),

    /// URL schemes other than `file://`
    #[error("unsupported document source '{0}'")]
    UnsupportedSource(String),
}

/// Anything that can go wrong while processing one document
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Loading failed
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// A stage failed
    #[error(transparent)]
    Stage(#[from] StageError),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, PipelineError>;
