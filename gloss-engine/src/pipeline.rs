//! Pipeline assembly and execution
//!
//! A [`Pipeline`] is an ordered list of stages validated once, when it is
//! built: every layer a stage requires must be produced by some stage
//! before it. Execution then runs the stages strictly in order, one
//! document at a time.
//!
//! ```rust,no_run
//! use gloss_core::Document;
//! use gloss_engine::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::standard(&PipelineConfig::default()).unwrap();
//! let mut doc = Document::new("note.txt", "John Smith works at Acme Corp.");
//! let report = pipeline.execute(&mut doc).unwrap();
//! assert!(report.produced() > 0);
//! ```

use crate::config::PipelineConfig;
use crate::coref::OrthoMatcher;
use crate::error::{PipelineError, Result};
use crate::language::{load_gazetteer_lists, LanguageRules};
use crate::stages::{
    AnnotationDelete, DependencyParser, Gazetteer, Morphology, NeTransducer, OrthoMatcherStage,
    PosTagger, SentenceSplitter, Tokenizer,
};
use gloss_core::{AnnotationSet, Corpus, Document, Layer, Stage, StageDescriptor, StageError};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Gazetteer major type whose entries are company designators
const DESIGNATOR_LIST: &str = "org_key";

/// Outcome of one stage on one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// Stage name
    pub name: String,
    /// Wall-clock run time, zero when skipped
    pub elapsed: Duration,
    /// The stage found none of its inputs and did not run
    pub skipped: bool,
    /// Net number of annotations added across all sets
    pub produced: usize,
}

/// Per-document execution summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Document id
    pub document: String,
    /// One entry per stage, in pipeline order
    pub stages: Vec<StageReport>,
    /// Total wall-clock time
    pub elapsed: Duration,
}

impl ExecutionReport {
    /// Annotations added by all stages together
    pub fn produced(&self) -> usize {
        self.stages.iter().map(|s| s.produced).sum()
    }

    /// Names of the stages that were skipped
    pub fn skipped(&self) -> Vec<&str> {
        self.stages
            .iter()
            .filter(|s| s.skipped)
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Report of a named stage
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.name == name)
    }
}

/// Declarative stage list, validated by [`PipelineBuilder::build`]
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Box<dyn Stage>>,
    check_invariants: bool,
    stage_timeout: Option<Duration>,
}

impl PipelineBuilder {
    /// Empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Append an already boxed stage
    pub fn boxed(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Verify the non-overlap invariant after every stage
    pub fn check_invariants(mut self, enabled: bool) -> Self {
        self.check_invariants = enabled;
        self
    }

    /// Fail a stage whose run exceeds `timeout`
    pub fn stage_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stage_timeout = timeout;
        self
    }

    /// Check ordering and produce the pipeline
    pub fn build(self) -> Result<Pipeline> {
        let produced = validate(self.stages.iter().map(|s| s.descriptor()))?;

        log::info!(
            "assembled pipeline: {}",
            self.stages
                .iter()
                .map(|s| s.name())
                .collect::<Vec<_>>()
                .join(" -> ")
        );

        Ok(Pipeline {
            stages: self.stages,
            produced,
            check_invariants: self.check_invariants,
            stage_timeout: self.stage_timeout,
        })
    }
}

/// Walk the descriptors in order and return the union of produced layers
fn validate<'a>(descriptors: impl Iterator<Item = &'a StageDescriptor>) -> Result<BTreeSet<Layer>> {
    let mut names = HashSet::new();
    let mut available = BTreeSet::new();

    for descriptor in descriptors {
        if !names.insert(descriptor.name().to_string()) {
            return Err(PipelineError::DuplicateStage(descriptor.name().to_string()));
        }

        if !descriptor.is_reset() {
            let missing: Vec<Layer> = descriptor
                .required()
                .difference(&available)
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(PipelineError::Assembly {
                    stage: descriptor.name().to_string(),
                    missing,
                });
            }
        }

        available.extend(descriptor.produced().iter().cloned());
    }

    Ok(available)
}

/// Assembled, validated stage list
///
/// Stages are shared by every document the pipeline executes. Dropping the
/// pipeline releases them together with any loaded models.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    produced: BTreeSet<Layer>,
    check_invariants: bool,
    stage_timeout: Option<Duration>,
}

impl Pipeline {
    /// Start an empty builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The fixed stage order, configured by `config`
    ///
    /// annotation-delete, tokenizer, gazetteer, sentence-splitter,
    /// pos-tagger, morphology, ne-transducer, ortho-matcher and, when
    /// enabled, dependency-parser. Parser models are loaded here, once.
    pub fn standard(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;

        let mut rules = LanguageRules::english()?;
        if let Some(path) = &config.gazetteer_lists {
            rules.extend_gazetteer(load_gazetteer_lists(path)?);
        }
        let rules = Arc::new(rules);

        let designators = rules
            .gazetteer_lists()
            .iter()
            .filter(|list| list.major == DESIGNATOR_LIST)
            .flat_map(|list| list.entries.iter());

        let mut builder = Self::builder()
            .check_invariants(config.check_invariants)
            .stage_timeout(config.stage_timeout)
            .stage(AnnotationDelete::new(config.keep_sets.clone()))
            .stage(Tokenizer::new())
            .stage(Gazetteer::new(rules.gazetteer_lists()))
            .stage(SentenceSplitter::new(Arc::clone(&rules)))
            .stage(PosTagger::new(Arc::clone(&rules)))
            .stage(Morphology::new(Arc::clone(&rules)))
            .stage(NeTransducer::new()?)
            .stage(OrthoMatcherStage::new(OrthoMatcher::new(designators)));

        if config.enable_parser {
            let models_path = config.models_path.as_deref().ok_or_else(|| {
                PipelineError::Configuration("the parser needs a models path".into())
            })?;
            builder = builder.stage(DependencyParser::load(models_path, &config.model_files)?);
        } else {
            log::debug!("dependency parser disabled, no models loaded");
        }

        builder.build()
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Stage descriptors in execution order
    pub fn descriptors(&self) -> impl Iterator<Item = &StageDescriptor> {
        self.stages.iter().map(|s| s.descriptor())
    }

    /// Union of the layers every stage produces
    pub fn produced_layers(&self) -> &BTreeSet<Layer> {
        &self.produced
    }

    /// Whether some stage produces `layer`
    pub fn produces(&self, layer: &Layer) -> bool {
        self.produced.contains(layer)
    }

    /// Run every stage on `document`, in order
    ///
    /// The first failing stage aborts the rest. Annotations written before
    /// the failure stay in the document.
    pub fn execute(&self, document: &mut Document) -> std::result::Result<ExecutionReport, StageError> {
        let started = Instant::now();
        let mut reports = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let descriptor = stage.descriptor();
            let name = stage.name();

            if !descriptor.is_reset() && !descriptor.has_input(document) {
                log::trace!("skipping '{}' on '{}': no input annotations", name, document.id());
                reports.push(StageReport {
                    name: name.to_string(),
                    elapsed: Duration::ZERO,
                    skipped: true,
                    produced: 0,
                });
                continue;
            }

            log::debug!("running '{}' on '{}'", name, document.id());
            let before = live_annotations(document);
            let stage_started = Instant::now();

            if let Err(e) = stage.run(document) {
                log::debug!("'{}' failed on '{}', remaining stages skipped", name, document.id());
                return Err(e);
            }

            let elapsed = stage_started.elapsed();
            let produced = live_annotations(document).saturating_sub(before);
            log::debug!(
                "finished '{}' on '{}' in {:?}, {} annotations added",
                name,
                document.id(),
                elapsed,
                produced
            );

            if let Some(limit) = self.stage_timeout {
                if elapsed > limit {
                    return Err(StageError::Timeout {
                        stage: name.to_string(),
                        elapsed,
                        limit,
                    });
                }
            }

            if self.check_invariants {
                if let Some((set, ty, first, second)) = document.find_overlap() {
                    log::debug!("overlap in set '{set}' after '{name}'");
                    return Err(StageError::InvariantViolation {
                        stage: name.to_string(),
                        ty,
                        first,
                        second,
                    });
                }
            }

            reports.push(StageReport {
                name: name.to_string(),
                elapsed,
                skipped: false,
                produced,
            });
        }

        Ok(ExecutionReport {
            document: document.id().to_string(),
            stages: reports,
            elapsed: started.elapsed(),
        })
    }

    /// Run every document of `corpus` in order
    ///
    /// A failure on one document does not stop the others.
    pub fn execute_corpus(
        &self,
        corpus: &mut Corpus,
    ) -> Vec<std::result::Result<ExecutionReport, StageError>> {
        corpus.iter_mut().map(|doc| self.execute(doc)).collect()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("check_invariants", &self.check_invariants)
            .field("stage_timeout", &self.stage_timeout)
            .finish()
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        log::debug!("releasing pipeline with {} stages", self.stages.len());
    }
}

fn live_annotations(document: &Document) -> usize {
    document.sets().map(AnnotationSet::len).sum()
}
