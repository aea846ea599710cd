//! Inflectional morphology: roots and affixes

use super::{feature, set_feature, tokens_within};
use crate::language::LanguageRules;
use gloss_core::{AnnotationType, Document, Span, Stage, StageDescriptor, StageError};
use std::sync::Arc;

/// Stem endings that lost a final `e` when inflected (`created`, `living`)
const RESTORE_E: &[&str] = &["at", "iz", "bl", "ur", "iv", "ak", "av", "ov", "uc", "ens", "rg", "dg"];

/// Writes `Token.root` and, for inflected words, `Token.affix`
#[derive(Debug, Clone)]
pub struct Morphology {
    descriptor: StageDescriptor,
    rules: Arc<LanguageRules>,
}

impl Morphology {
    /// Stage name
    pub const NAME: &'static str = "morphology";

    /// Create the analyser
    pub fn new(rules: Arc<LanguageRules>) -> Self {
        let descriptor = StageDescriptor::new(Self::NAME)
            .requires([AnnotationType::Token.feature(feature::CATEGORY)])
            .produces([
                AnnotationType::Token.feature(feature::ROOT),
                AnnotationType::Token.feature(feature::AFFIX),
            ]);
        Self { descriptor, rules }
    }

    /// Root and stripped suffix of `word` tagged `category`
    pub fn analyse(&self, word: &str, category: &str) -> (String, Option<&'static str>) {
        let lower = word.to_lowercase();
        if let Some(root) = self.rules.irregular_root(&lower) {
            return (root.to_string(), None);
        }

        match category {
            "NNS" | "NNPS" | "VBZ" => strip_plural(&lower),
            "VBD" | "VBN" => strip_verbal(&lower, "ed"),
            "VBG" => strip_verbal(&lower, "ing"),
            _ => (lower, None),
        }
    }
}

fn strip_plural(word: &str) -> (String, Option<&'static str>) {
    if word.len() > 4 {
        if let Some(stem) = word.strip_suffix("ies") {
            return (format!("{stem}y"), Some("s"));
        }
    }
    for ending in ["sses", "shes", "ches", "xes", "zes"] {
        if word.ends_with(ending) {
            return (word[..word.len() - 2].to_string(), Some("es"));
        }
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.ends_with('s') && stem.chars().count() >= 2 => {
            (stem.to_string(), Some("s"))
        }
        _ => (word.to_string(), None),
    }
}

fn strip_verbal(word: &str, suffix: &'static str) -> (String, Option<&'static str>) {
    let Some(stem) = word.strip_suffix(suffix) else {
        return (word.to_string(), None);
    };
    if stem.chars().count() < 2 {
        return (word.to_string(), None);
    }

    if suffix == "ed" {
        if let Some(base) = stem.strip_suffix('i') {
            return (format!("{base}y"), Some(suffix));
        }
    }

    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    let doubled = n >= 3
        && chars[n - 1] == chars[n - 2]
        && !"aeiouslz".contains(chars[n - 1]);
    if doubled {
        return (chars[..n - 1].iter().collect(), Some(suffix));
    }

    if RESTORE_E.iter().any(|ending| stem.ends_with(ending)) {
        return (format!("{stem}e"), Some(suffix));
    }

    (stem.to_string(), Some(suffix))
}

impl Stage for Morphology {
    fn descriptor(&self) -> &StageDescriptor {
        &self.descriptor
    }

    fn run(&self, document: &mut Document) -> Result<(), StageError> {
        let tokens = tokens_within(document, Span::new(0, document.char_len()));

        for token in tokens.iter().filter(|t| t.is_word()) {
            let (root, affix) = self.analyse(&token.text, token.category());
            set_feature(document, Self::NAME, token.id, feature::ROOT, root)?;
            if let Some(affix) = affix {
                set_feature(document, Self::NAME, token.id, feature::AFFIX, affix)?;
            }
        }
        Ok(())
    }
}
