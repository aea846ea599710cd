//! Built-in annotators
//!
//! Each stage is constructed once, holds only immutable tables, and writes
//! into the default annotation set of the document it is given.

mod delete;
mod gazetteer;
mod morphology;
mod orthomatcher;
mod parser;
mod splitter;
mod tagger;
mod tokenizer;
mod transducer;

pub use delete::AnnotationDelete;
pub use gazetteer::{Gazetteer, LIST_SEPARATOR};
pub use morphology::Morphology;
pub use orthomatcher::OrthoMatcherStage;
pub use parser::DependencyParser;
pub use splitter::SentenceSplitter;
pub use tagger::PosTagger;
pub use tokenizer::Tokenizer;
pub use transducer::{kind as entity_kind, NeTransducer};

use gloss_core::{AnnotationId, AnnotationType, Document, FeatureMap, Span, StageError};

/// Feature names written by the built-in stages
pub mod feature {
    /// Surface string of a token
    pub const STRING: &str = "string";
    /// Token class, or entity class on `NamedEntity`
    pub const KIND: &str = "kind";
    /// Capitalisation pattern
    pub const ORTH: &str = "orth";
    /// Length in characters
    pub const LENGTH: &str = "length";
    /// Part-of-speech tag
    pub const CATEGORY: &str = "category";
    /// Morphological root
    pub const ROOT: &str = "root";
    /// Stripped inflectional suffix
    pub const AFFIX: &str = "affix";
    /// Gazetteer list major type
    pub const MAJOR_TYPE: &str = "majorType";
    /// Gazetteer list minor type
    pub const MINOR_TYPE: &str = "minorType";
    /// Rule that produced an entity
    pub const RULE: &str = "rule";
    /// Ids of every mention in an entity's chain
    pub const MATCHES: &str = "matches";
    /// Chain member ids
    pub const MEMBERS: &str = "members";
    /// Chain representative id
    pub const REPRESENTATIVE: &str = "representative";
    /// Lemma from the parser
    pub const LEMMA: &str = "lemma";
    /// Tag used by the parser
    pub const POS: &str = "pos";
    /// One-based position of the head within the sentence, 0 for the root
    pub const HEAD: &str = "head";
    /// Relation to the head
    pub const DEPREL: &str = "deprel";
}

/// Owned snapshot of a token, taken before a stage mutates the document
#[derive(Debug, Clone)]
pub(crate) struct TokenInfo {
    pub id: AnnotationId,
    pub span: Span,
    pub text: String,
    pub kind: String,
    pub orth: Option<String>,
    pub category: Option<String>,
}

impl TokenInfo {
    pub fn is_word(&self) -> bool {
        self.kind == "word"
    }

    pub fn is_number(&self) -> bool {
        self.kind == "number"
    }

    /// Word starting with an upper-case letter
    pub fn is_capitalised(&self) -> bool {
        matches!(
            self.orth.as_deref(),
            Some("upperInitial") | Some("allCaps") | Some("mixedCaps")
        )
    }

    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }
}

/// Tokens of the default set inside `span`, in offset order
pub(crate) fn tokens_within(document: &Document, span: Span) -> Vec<TokenInfo> {
    document
        .annotations()
        .within(&AnnotationType::Token, span)
        .into_iter()
        .map(|token| TokenInfo {
            id: token.id,
            span: token.span,
            text: document.text_of(token).to_string(),
            kind: token.feature_str(feature::KIND).unwrap_or("word").to_string(),
            orth: token.feature_str(feature::ORTH).map(str::to_string),
            category: token.feature_str(feature::CATEGORY).map(str::to_string),
        })
        .collect()
}

/// Sentence spans of the default set, or the whole text when there are none
pub(crate) fn sentence_spans(document: &Document) -> Vec<Span> {
    let spans: Vec<Span> = document
        .annotations()
        .of_type(&AnnotationType::Sentence)
        .map(|sentence| sentence.span)
        .collect();

    if spans.is_empty() {
        vec![Span::new(0, document.char_len())]
    } else {
        spans
    }
}

/// Add to the default set, attributing failures to `stage`
pub(crate) fn annotate(
    document: &mut Document,
    stage: &str,
    ty: AnnotationType,
    span: Span,
    features: FeatureMap,
) -> Result<AnnotationId, StageError> {
    document
        .annotate(ty, span.start, span.end, features)
        .map_err(|e| StageError::annotation(stage, e))
}

/// Set a feature on an existing annotation of the default set
pub(crate) fn set_feature(
    document: &mut Document,
    stage: &str,
    id: AnnotationId,
    name: &str,
    value: impl Into<gloss_core::FeatureValue>,
) -> Result<(), StageError> {
    document
        .annotations_mut()
        .set_feature(id, name, value)
        .map_err(|e| StageError::annotation(stage, e))
}
