//! Typed, feature-bearing spans

use crate::feature::{FeatureMap, FeatureValue};
use crate::span::Span;
use crate::types::AnnotationType;
use serde::{Deserialize, Serialize};

/// Identifier of an annotation, unique within its set
pub type AnnotationId = usize;

/// A typed record over a span of document text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Id, unique within the owning set and never reused
    pub id: AnnotationId,
    /// Annotation type
    #[serde(rename = "type")]
    pub ty: AnnotationType,
    /// Character span
    pub span: Span,
    /// Features, ordered by name
    pub features: FeatureMap,
}

impl Annotation {
    /// Start offset
    pub fn start(&self) -> usize {
        self.span.start
    }

    /// End offset
    pub fn end(&self) -> usize {
        self.span.end
    }

    /// Look up a feature
    pub fn feature(&self, name: &str) -> Option<&FeatureValue> {
        self.features.get(name)
    }

    /// Look up a string feature
    pub fn feature_str(&self, name: &str) -> Option<&str> {
        self.features.get(name).and_then(FeatureValue::as_str)
    }

    /// Set or replace a feature
    pub fn set_feature(&mut self, name: impl Into<String>, value: impl Into<FeatureValue>) {
        self.features.insert(name.into(), value.into());
    }

    /// Whether the annotation is of the given type
    pub fn is(&self, ty: &AnnotationType) -> bool {
        &self.ty == ty
    }
}
