//! Documents: immutable text plus mutable annotation sets

use crate::annotation::{Annotation, AnnotationId};
use crate::error::{AnnotationError, Result};
use crate::feature::{FeatureMap, FeatureValue};
use crate::set::AnnotationSet;
use crate::span::Span;
use crate::types::AnnotationType;
use crate::features;
use std::collections::BTreeMap;

/// Name of the default annotation set
pub const DEFAULT_SET: &str = "";

/// Feature names used on dependency arcs
pub mod arc {
    /// Governor token id
    pub const GOVERNOR: &str = "governor";
    /// Dependent token id
    pub const DEPENDENT: &str = "dependent";
    /// Relation label
    pub const LABEL: &str = "label";
}

/// A text buffer with its annotations
///
/// Offsets everywhere are character offsets. The byte position of every
/// character boundary is computed once so slicing stays O(1) and never
/// splits a UTF-8 sequence.
#[derive(Debug, Clone)]
pub struct Document {
    id: String,
    text: String,
    boundaries: Vec<usize>,
    features: FeatureMap,
    default_set: AnnotationSet,
    named_sets: BTreeMap<String, AnnotationSet>,
}

impl Document {
    /// Create a document with an empty default set
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut boundaries: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        boundaries.push(text.len());
        let char_len = boundaries.len() - 1;

        Self {
            id: id.into(),
            text,
            boundaries,
            features: FeatureMap::new(),
            default_set: AnnotationSet::new(DEFAULT_SET, char_len),
            named_sets: BTreeMap::new(),
        }
    }

    /// Stable identity, usually the source file name
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The full text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text length in characters
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Text covered by a character span, `None` when out of bounds
    pub fn slice(&self, span: Span) -> Option<&str> {
        if span.start > span.end {
            return None;
        }
        let start = *self.boundaries.get(span.start)?;
        let end = *self.boundaries.get(span.end)?;
        self.text.get(start..end)
    }

    /// Text covered by an annotation of this document
    pub fn text_of(&self, annotation: &Annotation) -> &str {
        self.slice(annotation.span).unwrap_or_default()
    }

    /// Character offset of a byte offset that falls on a char boundary
    pub fn char_offset(&self, byte: usize) -> Option<usize> {
        self.boundaries.binary_search(&byte).ok()
    }

    /// Document-level features (source, encoding, ...)
    pub fn features(&self) -> &FeatureMap {
        &self.features
    }

    /// Mutable document-level features
    pub fn features_mut(&mut self) -> &mut FeatureMap {
        &mut self.features
    }

    /// The default annotation set
    pub fn annotations(&self) -> &AnnotationSet {
        &self.default_set
    }

    /// The default annotation set, mutably
    pub fn annotations_mut(&mut self) -> &mut AnnotationSet {
        &mut self.default_set
    }

    /// A set by name; `""` is the default set
    pub fn set(&self, name: &str) -> Option<&AnnotationSet> {
        if name == DEFAULT_SET {
            Some(&self.default_set)
        } else {
            self.named_sets.get(name)
        }
    }

    /// A set by name, created empty on first use
    pub fn set_mut(&mut self, name: &str) -> &mut AnnotationSet {
        if name == DEFAULT_SET {
            return &mut self.default_set;
        }
        let len = self.char_len();
        self.named_sets
            .entry(name.to_string())
            .or_insert_with(|| AnnotationSet::new(name, len))
    }

    /// All sets, default set first, then named sets in name order
    pub fn sets(&self) -> impl Iterator<Item = &AnnotationSet> {
        std::iter::once(&self.default_set).chain(self.named_sets.values())
    }

    /// Names of the auxiliary sets
    pub fn set_names(&self) -> impl Iterator<Item = &str> {
        self.named_sets.keys().map(String::as_str)
    }

    /// Create an annotation in the default set
    pub fn annotate(
        &mut self,
        ty: AnnotationType,
        start: usize,
        end: usize,
        features: FeatureMap,
    ) -> Result<AnnotationId> {
        self.default_set.add(ty, start, end, features)
    }

    /// Empty every set except those named in `keep`
    ///
    /// Named sets that are cleared are dropped entirely.
    pub fn clear_annotations(&mut self, keep: &[String]) {
        if !keep.iter().any(|k| k == DEFAULT_SET) {
            self.default_set.clear();
        }
        self.named_sets.retain(|name, _| keep.contains(name));
    }

    /// Link two tokens of set `set` with a labelled dependency arc
    ///
    /// Both ends must already exist as `Token` annotations of that set.
    /// The arc spans the dependent token; a token has at most one governor,
    /// so arcs of one set never overlap.
    pub fn add_dependency(
        &mut self,
        set: &str,
        governor: AnnotationId,
        dependent: AnnotationId,
        label: &str,
    ) -> Result<AnnotationId> {
        let target = self.set_mut(set);
        token_span(target, governor, "governor")?;
        let span = token_span(target, dependent, "dependent")?;

        target.add(
            AnnotationType::DependencyArc,
            span.start,
            span.end,
            features! {
                arc::GOVERNOR => vec![governor],
                arc::DEPENDENT => vec![dependent],
                arc::LABEL => label,
            },
        )
    }

    /// Live annotation count per type across all sets
    pub fn annotation_summary(&self) -> BTreeMap<AnnotationType, usize> {
        let mut summary = BTreeMap::new();
        for set in self.sets() {
            for (ty, count) in set.type_counts() {
                *summary.entry(ty).or_insert(0) += count;
            }
        }
        summary
    }

    /// First same-type overlap in any set, with the set name
    pub fn find_overlap(&self) -> Option<(String, AnnotationType, AnnotationId, AnnotationId)> {
        self.sets().find_map(|set| {
            set.find_overlap()
                .map(|(ty, a, b)| (set.name().to_string(), ty, a, b))
        })
    }

    /// Record a document-level feature
    pub fn set_feature(&mut self, name: impl Into<String>, value: impl Into<FeatureValue>) {
        self.features.insert(name.into(), value.into());
    }
}

fn token_span(set: &AnnotationSet, id: AnnotationId, role: &'static str) -> Result<Span> {
    let annotation = set
        .get(id)
        .ok_or(AnnotationError::DanglingReference { role, id })?;
    if annotation.ty != AnnotationType::Token {
        return Err(AnnotationError::NotAToken(id));
    }
    Ok(annotation.span)
}
