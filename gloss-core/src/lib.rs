//! Span and annotation model for document analysis pipelines
//!
//! A [`Document`] owns an immutable text and a collection of
//! [`AnnotationSet`]s. Every [`Annotation`] is a typed, feature-bearing
//! character span. Pipeline stages implement the [`Stage`] trait and
//! describe what they read and write with a [`StageDescriptor`].
//!
//! # Example
//!
//! ```rust
//! use gloss_core::{features, AnnotationType, Document, Span};
//!
//! let mut doc = Document::new("greeting.txt", "Hello world.");
//! let hello = doc
//!     .annotate(AnnotationType::Token, 0, 5, features! { "kind" => "word" })
//!     .unwrap();
//!
//! let token = doc.annotations().get(hello).unwrap();
//! assert_eq!(doc.text_of(token), "Hello");
//! assert_eq!(token.span, Span::new(0, 5));
//! ```

#![warn(missing_docs)]

pub mod annotation;
pub mod corpus;
pub mod document;
pub mod error;
pub mod feature;
pub mod set;
pub mod span;
pub mod stage;
pub mod types;

pub use annotation::{Annotation, AnnotationId};
pub use corpus::Corpus;
pub use document::{arc, Document, DEFAULT_SET};
pub use error::{AnnotationError, Result, StageError};
pub use feature::{FeatureMap, FeatureValue};
pub use set::AnnotationSet;
pub use span::Span;
pub use stage::{Stage, StageDescriptor};
pub use types::{AnnotationType, Layer};
