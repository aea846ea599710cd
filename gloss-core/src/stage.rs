//! The contract every pipeline stage implements

use crate::document::Document;
use crate::error::StageError;
use crate::types::{AnnotationType, Layer};
use std::collections::BTreeSet;

/// Static metadata describing what a stage reads and writes
///
/// Used by the orchestrator to validate ordering before anything runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDescriptor {
    name: String,
    requires: BTreeSet<Layer>,
    produces: BTreeSet<Layer>,
    resets: bool,
}

impl StageDescriptor {
    /// Descriptor with no inputs and no outputs
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires: BTreeSet::new(),
            produces: BTreeSet::new(),
            resets: false,
        }
    }

    /// Add required input layers
    pub fn requires(mut self, layers: impl IntoIterator<Item = Layer>) -> Self {
        self.requires.extend(layers);
        self
    }

    /// Add produced output layers
    pub fn produces(mut self, layers: impl IntoIterator<Item = Layer>) -> Self {
        self.produces.extend(layers);
        self
    }

    /// Mark the stage as the one allowed to clear all annotation sets
    pub fn resetting(mut self) -> Self {
        self.resets = true;
        self
    }

    /// Stage name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Required input layers
    pub fn required(&self) -> &BTreeSet<Layer> {
        &self.requires
    }

    /// Produced output layers
    pub fn produced(&self) -> &BTreeSet<Layer> {
        &self.produces
    }

    /// Whether this stage clears annotations before the pipeline proper
    pub fn is_reset(&self) -> bool {
        self.resets
    }

    /// Annotation types behind the required layers
    pub fn input_types(&self) -> BTreeSet<&AnnotationType> {
        self.requires.iter().map(|layer| &layer.ty).collect()
    }

    /// Whether a document carries anything for this stage to work on
    ///
    /// Stages without inputs always have work. Otherwise at least one of the
    /// required annotation types must be present in the default set.
    pub fn has_input(&self, document: &Document) -> bool {
        let types = self.input_types();
        types.is_empty()
            || types
                .into_iter()
                .any(|ty| document.annotations().has_type(ty))
    }
}

/// A single annotator step
///
/// `run` takes `&self`: stages are built once and shared by every document
/// of a batch, so they cannot carry per-document state between calls.
pub trait Stage: Send + Sync {
    /// Static description of inputs and outputs
    fn descriptor(&self) -> &StageDescriptor;

    /// Annotate one document in place
    fn run(&self, document: &mut Document) -> Result<(), StageError>;

    /// Stage name, taken from the descriptor
    fn name(&self) -> &str {
        self.descriptor().name()
    }
}
