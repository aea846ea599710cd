//! Lexicon and suffix driven part-of-speech tagging

use super::{feature, sentence_spans, set_feature, tokens_within, TokenInfo};
use crate::language::LanguageRules;
use gloss_core::{AnnotationType, Document, Stage, StageDescriptor, StageError};
use std::sync::Arc;

/// Writes a Penn Treebank tag into `Token.category`
///
/// Tags are assigned left to right within each sentence; the previous tag
/// is the only context consulted.
#[derive(Debug, Clone)]
pub struct PosTagger {
    descriptor: StageDescriptor,
    rules: Arc<LanguageRules>,
}

impl PosTagger {
    /// Stage name
    pub const NAME: &'static str = "pos-tagger";

    /// Create a tagger over the given lexicon
    pub fn new(rules: Arc<LanguageRules>) -> Self {
        let descriptor = StageDescriptor::new(Self::NAME)
            .requires([
                AnnotationType::Token.layer(),
                AnnotationType::Sentence.layer(),
            ])
            .produces([AnnotationType::Token.feature(feature::CATEGORY)]);
        Self { descriptor, rules }
    }

    /// Tag one token given the tag before it, `None` at sentence start
    pub(crate) fn tag(&self, token: &TokenInfo, previous: Option<&str>) -> String {
        let text = token.text.as_str();

        match token.kind.as_str() {
            "number" => return "CD".into(),
            "punctuation" => return punctuation_tag(text).into(),
            "symbol" => return symbol_tag(text).into(),
            _ => {}
        }

        if token.is_capitalised() && text != "I" {
            return match previous {
                None => self
                    .rules
                    .closed_class_tag(text)
                    .unwrap_or("NNP")
                    .to_string(),
                Some(_) => "NNP".into(),
            };
        }

        if let Some(tag) = self.rules.closed_class_tag(text) {
            return tag.into();
        }

        if matches!(previous, Some("MD") | Some("TO")) {
            return "VB".into();
        }

        if let Some(tag) = self.rules.suffix_tag(text) {
            let after_auxiliary = matches!(previous, Some("VBZ") | Some("VBP") | Some("VBD"));
            return if tag == "VBD" && after_auxiliary {
                "VBN".into()
            } else {
                tag.into()
            };
        }

        let lower = text.to_lowercase();
        if lower.len() > 3
            && lower.ends_with('s')
            && !lower.ends_with("ss")
            && !lower.ends_with("us")
            && !lower.ends_with("is")
        {
            return match previous {
                Some("NNP") | Some("NN") | Some("PRP") => "VBZ".into(),
                _ => "NNS".into(),
            };
        }

        if matches!(previous, Some("PRP") | Some("NNS")) {
            return "VBP".into();
        }

        "NN".into()
    }
}

fn punctuation_tag(text: &str) -> &'static str {
    match text {
        "." | "!" | "?" => ".",
        "," => ",",
        ":" | ";" | "-" | "\u{2013}" | "\u{2014}" | "\u{2026}" => ":",
        "(" | "[" | "{" => "-LRB-",
        ")" | "]" | "}" => "-RRB-",
        "\u{201C}" | "\u{2018}" | "\u{00AB}" => "``",
        "\"" | "'" | "\u{201D}" | "\u{2019}" | "\u{00BB}" => "''",
        _ => "SYM",
    }
}

fn symbol_tag(text: &str) -> &'static str {
    match text {
        "$" | "\u{20AC}" | "\u{00A3}" | "\u{00A5}" => "$",
        "%" => "NN",
        "#" => "#",
        "&" => "CC",
        _ => "SYM",
    }
}

impl Stage for PosTagger {
    fn descriptor(&self) -> &StageDescriptor {
        &self.descriptor
    }

    fn run(&self, document: &mut Document) -> Result<(), StageError> {
        for sentence in sentence_spans(document) {
            let tokens = tokens_within(document, sentence);
            let mut previous: Option<String> = None;

            for token in &tokens {
                let tag = self.tag(token, previous.as_deref());
                set_feature(document, Self::NAME, token.id, feature::CATEGORY, tag.as_str())?;
                previous = Some(tag);
            }
        }
        Ok(())
    }
}
