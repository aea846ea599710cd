//! Coreference stage over named entities

use super::{annotate, feature, set_feature, tokens_within};
use crate::coref::{Mention, OrthoMatcher, VariantIndex};
use gloss_core::{
    features, AnnotationId, AnnotationType, Document, Span, Stage, StageDescriptor, StageError,
};

/// A `NamedEntity` as the matcher sees it
#[derive(Debug, Clone)]
struct Entity {
    id: AnnotationId,
    span: Span,
    text: String,
    kind: String,
}

fn entities(document: &Document) -> Vec<Entity> {
    document
        .annotations()
        .of_type(&AnnotationType::NamedEntity)
        .map(|e| Entity {
            id: e.id,
            span: e.span,
            text: document.text_of(e).to_string(),
            kind: e.feature_str(feature::KIND).unwrap_or_default().to_string(),
        })
        .collect()
}

fn mentions(entities: &[Entity]) -> Vec<Mention<'_>> {
    entities
        .iter()
        .map(|e| Mention {
            id: e.id,
            text: &e.text,
            kind: &e.kind,
        })
        .collect()
}

/// Finds unannotated repeats of known entities and groups every
/// `NamedEntity` into `CorefChain` annotations
///
/// A repeat is a run of tokens outside any entity, starting with a
/// capitalised word and ending with a word or number, whose normalised text
/// is a name or variant of an earlier entity: `Smith` after `John Smith`,
/// `Acme` after `Acme Corp.`. It becomes a `NamedEntity` of the same kind
/// with rule `ortho-matcher`.
///
/// Every chain member gets a `matches` feature listing the ids of the whole
/// chain. A chain annotation spans its representative.
#[derive(Debug, Clone)]
pub struct OrthoMatcherStage {
    descriptor: StageDescriptor,
    matcher: OrthoMatcher,
}

impl OrthoMatcherStage {
    /// Stage name
    pub const NAME: &'static str = "ortho-matcher";

    /// Wrap a configured matcher
    pub fn new(matcher: OrthoMatcher) -> Self {
        let descriptor = StageDescriptor::new(Self::NAME)
            .requires([
                AnnotationType::Token.layer(),
                AnnotationType::NamedEntity.layer(),
            ])
            .produces([
                AnnotationType::NamedEntity.layer(),
                AnnotationType::NamedEntity.feature(feature::KIND),
                AnnotationType::NamedEntity.feature(feature::RULE),
                AnnotationType::NamedEntity.feature(feature::MATCHES),
                AnnotationType::CorefChain.layer(),
                AnnotationType::CorefChain.feature(feature::MEMBERS),
                AnnotationType::CorefChain.feature(feature::REPRESENTATIVE),
            ]);
        Self { descriptor, matcher }
    }

    /// Spans and kinds of repeats that no entity covers yet
    fn find_repeats(document: &Document, entities: &[Entity], index: &VariantIndex) -> Vec<(Span, String)> {
        if index.is_empty() {
            return Vec::new();
        }

        let tokens = tokens_within(document, Span::new(0, document.char_len()));

        // entities are ordered and disjoint, so one pass over both suffices
        let mut next = 0;
        let covered: Vec<bool> = tokens
            .iter()
            .map(|token| {
                while entities.get(next).is_some_and(|e| e.span.end <= token.span.start) {
                    next += 1;
                }
                entities.get(next).is_some_and(|e| e.span.overlaps(&token.span))
            })
            .collect();

        // punctuation tokens sit between the words of a key
        let window = index.max_words() * 2;
        let mut found = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let first = &tokens[i];
            let hit = if covered[i] || !first.is_word() || !first.is_capitalised() {
                None
            } else {
                let free = covered[i..].iter().take(window).take_while(|c| !**c).count();
                (1..=free).rev().find_map(|len| {
                    let last = &tokens[i + len - 1];
                    if !last.is_word() && !last.is_number() {
                        return None;
                    }
                    let span = Span::new(first.span.start, last.span.end);
                    let text = document.slice(span).filter(|t| !t.contains('\n'))?;
                    let owner = index.get(text)?;
                    (entities[owner.mention].span.end <= span.start)
                        .then(|| (len, span, owner.kind.clone()))
                })
            };

            match hit {
                Some((len, span, kind)) => {
                    found.push((span, kind));
                    i += len;
                }
                None => i += 1,
            }
        }
        found
    }
}

impl Stage for OrthoMatcherStage {
    fn descriptor(&self) -> &StageDescriptor {
        &self.descriptor
    }

    fn run(&self, document: &mut Document) -> Result<(), StageError> {
        let mut known = entities(document);

        let repeats = {
            let mentions = mentions(&known);
            let chains = self.matcher.resolve(&mentions);
            let index = self.matcher.variant_index(&mentions, &chains);
            Self::find_repeats(document, &known, &index)
        };
        if !repeats.is_empty() {
            for (span, kind) in &repeats {
                annotate(
                    document,
                    Self::NAME,
                    AnnotationType::NamedEntity,
                    *span,
                    features! {
                        feature::KIND => kind.as_str(),
                        feature::RULE => Self::NAME,
                    },
                )?;
            }
            known = entities(document);
        }

        let chains = self.matcher.resolve(&mentions(&known));

        for chain in &chains {
            for &member in &chain.members {
                set_feature(document, Self::NAME, member, feature::MATCHES, chain.members.clone())?;
            }

            let Some(representative) = known.iter().find(|e| e.id == chain.representative) else {
                continue;
            };
            annotate(
                document,
                Self::NAME,
                AnnotationType::CorefChain,
                representative.span,
                features! {
                    feature::MEMBERS => chain.members.clone(),
                    feature::REPRESENTATIVE => vec![chain.representative],
                    feature::KIND => chain.kind.as_str(),
                    feature::STRING => representative.text.as_str(),
                },
            )?;
        }

        log::trace!(
            "{}: {} repeats, {} chains in '{}'",
            Self::NAME,
            repeats.len(),
            chains.len(),
            document.id()
        );
        Ok(())
    }
}
