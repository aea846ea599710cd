//! Pipeline orchestration and built-in annotators
//!
//! This crate assembles [`Stage`]s into a validated [`Pipeline`], ships the
//! standard English annotators (tokenizer through dependency parser), and
//! resolves orthographic coreference between named entities.
//!
//! # Example
//!
//! ```rust,no_run
//! use gloss_core::{AnnotationType, Document};
//! use gloss_engine::{Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::standard(&PipelineConfig::default())?;
//! let mut doc = Document::new("a.txt", "John Smith works at Acme Corp. He founded it in 1998.");
//! pipeline.execute(&mut doc)?;
//!
//! for entity in doc.annotations().of_type(&AnnotationType::NamedEntity) {
//!     println!("{}", doc.text_of(entity));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod coref;
pub mod error;
pub mod input;
pub mod language;
pub mod models;
pub mod pipeline;
pub mod stages;

pub use config::{ModelFiles, PipelineConfig, PipelineConfigBuilder};
pub use coref::{Chain, Mention, OrthoMatcher};
pub use error::{DocumentError, PipelineError, ProcessError, Result};
pub use input::DocumentLoader;
pub use language::LanguageRules;
pub use pipeline::{ExecutionReport, Pipeline, PipelineBuilder, StageReport};

pub use gloss_core::{Corpus, Document, Stage, StageDescriptor, StageError};
