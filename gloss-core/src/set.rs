//! Named, offset-ordered annotation collections

use crate::annotation::{Annotation, AnnotationId};
use crate::error::{AnnotationError, Result};
use crate::feature::{FeatureMap, FeatureValue};
use crate::span::Span;
use crate::types::AnnotationType;
use std::collections::BTreeMap;

/// Removed entries tolerated in the index before it is compacted
const COMPACT_THRESHOLD: usize = 64;

/// Position of one annotation in a per-type index
#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    span: Span,
    id: AnnotationId,
}

impl IndexEntry {
    /// Ordering key: start, then shorter span, then creation order
    fn key(&self) -> (usize, usize, AnnotationId) {
        (self.span.start, self.span.len(), self.id)
    }
}

/// Annotations of one document, grouped under a name
///
/// Storage is a slot vector addressed by id, so lookups and removals are
/// O(1) and ids stay valid for the lifetime of the set. A per-type index
/// keeps entries sorted by `(start, length, id)`; removed entries are
/// dropped from the index lazily.
#[derive(Debug, Clone)]
pub struct AnnotationSet {
    name: String,
    text_len: usize,
    slots: Vec<Option<Annotation>>,
    index: BTreeMap<AnnotationType, Vec<IndexEntry>>,
    live: usize,
    stale: usize,
}

impl AnnotationSet {
    /// Create an empty set over a text of `text_len` characters
    pub fn new(name: impl Into<String>, text_len: usize) -> Self {
        Self {
            name: name.into(),
            text_len,
            slots: Vec::new(),
            index: BTreeMap::new(),
            live: 0,
            stale: 0,
        }
    }

    /// Set name; the default set is named `""`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of live annotations
    pub fn len(&self) -> usize {
        self.live
    }

    /// True when no live annotations remain
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Create an annotation and return its id
    ///
    /// Fails with [`AnnotationError::InvalidSpan`] when `start > end` or
    /// either offset lies beyond the text, and with
    /// [`AnnotationError::Overlap`] when it would overlap an existing
    /// annotation of the same type. Empty spans never overlap anything.
    pub fn add(
        &mut self,
        ty: AnnotationType,
        start: usize,
        end: usize,
        features: FeatureMap,
    ) -> Result<AnnotationId> {
        if start > end || end > self.text_len {
            return Err(AnnotationError::InvalidSpan {
                start,
                end,
                len: self.text_len,
            });
        }

        let span = Span::new(start, end);
        let id = self.slots.len();
        let entry = IndexEntry { span, id };
        let pos = {
            let entries = self.index.entry(ty.clone()).or_default();
            entries.partition_point(|e| e.key() < entry.key())
        };

        if !span.is_empty() {
            if let Some(existing) = self.neighbour_overlap(&ty, pos, span) {
                return Err(AnnotationError::Overlap {
                    ty,
                    new: span,
                    existing: existing.id,
                    existing_span: existing.span,
                });
            }
        }

        self.index.entry(ty.clone()).or_default().insert(pos, entry);
        self.slots.push(Some(Annotation {
            id,
            ty,
            span,
            features,
        }));
        self.live += 1;
        Ok(id)
    }

    /// Nearest live, non-empty neighbours of an insertion point that overlap `span`
    ///
    /// Live entries of one type never overlap each other, so their ends are
    /// ordered like their starts and only the closest neighbour on each side
    /// can collide.
    fn neighbour_overlap(&self, ty: &AnnotationType, pos: usize, span: Span) -> Option<IndexEntry> {
        let entries = self.index.get(ty)?;
        let usable = |e: &&IndexEntry| !e.span.is_empty() && self.is_live(e.id);

        let before = entries[..pos].iter().rev().find(usable);
        let after = entries[pos..].iter().find(usable);

        before
            .into_iter()
            .chain(after)
            .find(|e| e.span.overlaps(&span))
            .copied()
    }

    fn is_live(&self, id: AnnotationId) -> bool {
        matches!(self.slots.get(id), Some(Some(_)))
    }

    /// Look up a live annotation
    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    /// Set a feature on a live annotation
    ///
    /// Type and span are fixed at creation, so features are the only part of
    /// a stored annotation that can change.
    pub fn set_feature(
        &mut self,
        id: AnnotationId,
        name: impl Into<String>,
        value: impl Into<FeatureValue>,
    ) -> Result<()> {
        let annotation = self
            .slots
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(AnnotationError::UnknownAnnotation(id))?;
        annotation.set_feature(name, value);
        Ok(())
    }

    /// Remove an annotation; other ids are unaffected
    pub fn remove(&mut self, id: AnnotationId) -> Result<Annotation> {
        let removed = self
            .slots
            .get_mut(id)
            .and_then(Option::take)
            .ok_or(AnnotationError::UnknownAnnotation(id))?;

        self.live -= 1;
        self.stale += 1;
        if self.stale > COMPACT_THRESHOLD && self.stale > self.live {
            self.compact();
        }
        Ok(removed)
    }

    fn compact(&mut self) {
        let slots = &self.slots;
        for entries in self.index.values_mut() {
            entries.retain(|e| matches!(slots.get(e.id), Some(Some(_))));
        }
        self.index.retain(|_, entries| !entries.is_empty());
        self.stale = 0;
    }

    /// Drop every annotation and restart id allocation
    ///
    /// Clearing is what makes reprocessing reproducible: a fresh run over a
    /// cleared set hands out the same ids as a run over a new document.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
        self.live = 0;
        self.stale = 0;
    }

    /// Live annotations of one type, in offset order
    pub fn of_type<'a>(&'a self, ty: &AnnotationType) -> impl Iterator<Item = &'a Annotation> + 'a {
        self.index
            .get(ty)
            .into_iter()
            .flat_map(|entries| entries.iter())
            .filter_map(move |e| self.get(e.id))
    }

    /// True when at least one live annotation of `ty` exists
    pub fn has_type(&self, ty: &AnnotationType) -> bool {
        self.of_type(ty).next().is_some()
    }

    /// Annotations ordered by start, then shorter span, then creation order
    ///
    /// `ty` restricts the result to one type, `overlapping` to annotations
    /// that share at least one character with the given span.
    pub fn query(&self, ty: Option<&AnnotationType>, overlapping: Option<Span>) -> Vec<&Annotation> {
        let keep = |a: &&Annotation| overlapping.map_or(true, |s| a.span.overlaps(&s));

        match ty {
            Some(ty) => self.of_type(ty).filter(keep).collect(),
            None => {
                let mut all: Vec<&Annotation> = self.iter().filter(keep).collect();
                all.sort_by_key(|a| (a.span.start, a.span.len(), a.id));
                all
            }
        }
    }

    /// Annotations of `ty` lying entirely inside `span`, in offset order
    pub fn within(&self, ty: &AnnotationType, span: Span) -> Vec<&Annotation> {
        let Some(entries) = self.index.get(ty) else {
            return Vec::new();
        };

        let first = entries.partition_point(|e| e.span.start < span.start);
        entries[first..]
            .iter()
            .take_while(|e| e.span.start <= span.end)
            .filter(|e| span.contains(&e.span))
            .filter_map(|e| self.get(e.id))
            .collect()
    }

    /// Every live annotation in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Live annotation count per type
    pub fn type_counts(&self) -> BTreeMap<AnnotationType, usize> {
        let mut counts = BTreeMap::new();
        for annotation in self.iter() {
            *counts.entry(annotation.ty.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Types with at least one live annotation, in type order
    pub fn types(&self) -> Vec<&AnnotationType> {
        self.index
            .iter()
            .filter(|(_, entries)| entries.iter().any(|e| self.is_live(e.id)))
            .map(|(ty, _)| ty)
            .collect()
    }

    /// Fail with [`AnnotationError::Overlap`] if the non-overlap invariant is broken
    pub fn check_invariants(&self) -> Result<()> {
        match self.find_overlap() {
            None => Ok(()),
            Some((ty, first, second)) => {
                let existing_span = self.get(first).map(|a| a.span).unwrap_or_default();
                let new = self.get(second).map(|a| a.span).unwrap_or_default();
                Err(AnnotationError::Overlap {
                    ty,
                    new,
                    existing: first,
                    existing_span,
                })
            }
        }
    }

    /// First pair of overlapping annotations of the same type
    pub fn find_overlap(&self) -> Option<(AnnotationType, AnnotationId, AnnotationId)> {
        for (ty, entries) in &self.index {
            let mut previous: Option<&Annotation> = None;
            for annotation in entries.iter().filter_map(|e| self.get(e.id)) {
                if annotation.span.is_empty() {
                    continue;
                }
                if let Some(prev) = previous {
                    if prev.span.overlaps(&annotation.span) {
                        return Some((ty.clone(), prev.id, annotation.id));
                    }
                }
                previous = Some(annotation);
            }
        }
        None
    }
}
