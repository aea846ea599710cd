//! Deterministic dependency parsing

use super::{feature, sentence_spans, set_feature, tokens_within, TokenInfo};
use crate::config::ModelFiles;
use crate::models::ModelSet;
use gloss_core::{AnnotationType, Document, Stage, StageDescriptor, StageError, DEFAULT_SET};
use std::path::Path;

/// Label of the sentence root
pub const ROOT_LABEL: &str = "ROOT";

fn is_verb(tag: &str) -> bool {
    tag.starts_with("VB") || tag == "MD"
}

fn is_noun(tag: &str) -> bool {
    tag.starts_with("NN") || matches!(tag, "PRP" | "CD" | "WP" | "EX")
}

/// Nouns that can be pre-modifiers inside a run (`Acme Corp`)
fn is_run_noun(tag: &str) -> bool {
    tag.starts_with("NN") || tag == "CD"
}

fn is_modifier(tag: &str) -> bool {
    tag.starts_with("JJ") || matches!(tag, "DT" | "PRP$" | "POS")
}

/// Attaches every token of a sentence to a head, forming a single tree
///
/// The root is the last verb of the first verb group, or the first noun of
/// a verbless sentence. Noun runs attach to their last noun, which in turn
/// attaches to a preceding preposition or to the root as subject or object.
#[derive(Debug, Clone)]
pub struct DependencyParser {
    descriptor: StageDescriptor,
    models: ModelSet,
}

impl DependencyParser {
    /// Stage name
    pub const NAME: &'static str = "dependency-parser";

    /// Create a parser over loaded models
    pub fn new(models: ModelSet) -> Self {
        let descriptor = StageDescriptor::new(Self::NAME)
            .requires([
                AnnotationType::Token.feature(feature::CATEGORY),
                AnnotationType::Sentence.layer(),
            ])
            .produces([
                AnnotationType::DependencyArc.layer(),
                AnnotationType::Token.feature(feature::LEMMA),
                AnnotationType::Token.feature(feature::POS),
                AnnotationType::Token.feature(feature::HEAD),
                AnnotationType::Token.feature(feature::DEPREL),
            ]);
        Self { descriptor, models }
    }

    /// Load the three model artifacts under `base`
    pub fn load(base: &Path, files: &ModelFiles) -> crate::error::Result<Self> {
        Ok(Self::new(ModelSet::load(base, files)?))
    }

    /// Head index and label for every token; the root points at itself
    pub(crate) fn attach(&self, tokens: &[TokenInfo], tags: &[String]) -> Vec<(usize, String)> {
        let n = tokens.len();
        if n == 0 {
            return Vec::new();
        }

        let root = (0..n)
            .find(|&i| is_verb(&tags[i]) && !tags.get(i + 1).is_some_and(|t| is_verb(t)))
            .or_else(|| (0..n).find(|&i| is_noun(&tags[i])))
            .unwrap_or(0);

        let run_end = |mut j: usize| {
            while j + 1 < n && is_run_noun(&tags[j]) && is_run_noun(&tags[j + 1]) {
                j += 1;
            }
            j
        };

        (0..n)
            .map(|i| {
                if i == root {
                    return (root, ROOT_LABEL.to_string());
                }
                let tag = tags[i].as_str();
                let (head, label) = if tokens[i].kind == "punctuation" {
                    (root, "P")
                } else if is_verb(tag) {
                    let in_group = i < root && (i..root).all(|k| is_verb(&tags[k]) || tags[k] == "RB");
                    (root, if in_group { "VC" } else { "DEP" })
                } else if is_noun(tag) {
                    if is_run_noun(tag) && run_end(i) != i {
                        (run_end(i), "NMOD")
                    } else {
                        self.attach_noun_head(tags, i, root)
                    }
                } else if is_modifier(tag) {
                    (i + 1..n)
                        .take_while(|&j| is_noun(&tags[j]) || is_modifier(&tags[j]) || tags[j] == "RB")
                        .find(|&j| is_noun(&tags[j]))
                        .map_or((root, "DEP"), |j| (run_end(j), "NMOD"))
                } else if tag == "IN" || tag == "TO" {
                    let verb = (0..i).rev().find(|&k| is_verb(&tags[k]));
                    let noun = (0..i).rev().find(|&k| is_noun(&tags[k]));
                    match (verb, noun) {
                        (Some(k), _) => (k, "ADV"),
                        (None, Some(k)) => (k, "NMOD"),
                        (None, None) => (root, "ADV"),
                    }
                } else if tag.starts_with("RB") {
                    (0..n)
                        .filter(|&k| is_verb(&tags[k]))
                        .min_by_key(|&k| k.abs_diff(i))
                        .map_or((root, "ADV"), |k| (k, "ADV"))
                } else if tag == "CC" {
                    (root, "COORD")
                } else {
                    (root, "DEP")
                };

                let label = self
                    .models
                    .label(tag, &tags[head])
                    .unwrap_or(label)
                    .to_string();
                (head, label)
            })
            .collect()
    }

    /// Last noun of a run: object of a preceding preposition, else subject or object
    fn attach_noun_head(&self, tags: &[String], i: usize, root: usize) -> (usize, &'static str) {
        let mut k = i;
        while k > 0 {
            k -= 1;
            let tag = tags[k].as_str();
            if tag == "IN" || tag == "TO" {
                return (k, "PMOD");
            }
            if !(is_modifier(tag) || is_run_noun(tag)) {
                break;
            }
        }
        (root, if i < root { "SBJ" } else { "OBJ" })
    }
}

impl Stage for DependencyParser {
    fn descriptor(&self) -> &StageDescriptor {
        &self.descriptor
    }

    fn run(&self, document: &mut Document) -> Result<(), StageError> {
        for span in sentence_spans(document) {
            let tokens = tokens_within(document, span);
            let tags: Vec<String> = tokens
                .iter()
                .map(|t| {
                    self.models
                        .tag(&t.text)
                        .unwrap_or_else(|| t.category().trim())
                        .to_string()
                })
                .map(|tag| if tag.is_empty() { "NN".to_string() } else { tag })
                .collect();

            let heads = self.attach(&tokens, &tags);

            for (i, (token, (head, label))) in tokens.iter().zip(&heads).enumerate() {
                let lemma = self
                    .models
                    .lemma(&token.text)
                    .map(str::to_string)
                    .or_else(|| {
                        document
                            .annotations()
                            .get(token.id)
                            .and_then(|a| a.feature_str(feature::ROOT))
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| token.text.to_lowercase());

                let position = if *head == i { 0 } else { head + 1 };
                set_feature(document, Self::NAME, token.id, feature::LEMMA, lemma)?;
                set_feature(document, Self::NAME, token.id, feature::POS, tags[i].as_str())?;
                set_feature(document, Self::NAME, token.id, feature::HEAD, position)?;
                set_feature(document, Self::NAME, token.id, feature::DEPREL, label.as_str())?;

                if *head != i {
                    document
                        .add_dependency(DEFAULT_SET, tokens[*head].id, token.id, label)
                        .map_err(|e| StageError::annotation(Self::NAME, e))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LabelRule;
    use gloss_core::{arc, features, Span};
    use std::collections::HashMap;

    fn sentence(words: &[(&str, &str)]) -> Document {
        let text = words.iter().map(|(w, _)| *w).collect::<Vec<_>>().join(" ");
        let mut doc = Document::new("d", text.clone());
        let mut offset = 0;
        for (word, tag) in words {
            let len = word.chars().count();
            let kind = if word.chars().all(|c| c.is_ascii_punctuation()) {
                "punctuation"
            } else {
                "word"
            };
            doc.annotate(
                AnnotationType::Token,
                offset,
                offset + len,
                features! { feature::CATEGORY => *tag, feature::KIND => kind },
            )
            .unwrap();
            offset += len + 1;
        }
        let end = text.chars().count();
        doc.annotate(AnnotationType::Sentence, 0, end, features! {}).unwrap();
        doc
    }

    fn heads(doc: &Document) -> Vec<(String, i64, String)> {
        doc.annotations()
            .of_type(&AnnotationType::Token)
            .map(|t| {
                (
                    doc.text_of(t).to_string(),
                    t.feature(feature::HEAD).and_then(|v| v.as_int()).unwrap_or(-1),
                    t.feature_str(feature::DEPREL).unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    fn row(word: &str, head: i64, label: &str) -> (String, i64, String) {
        (word.to_string(), head, label.to_string())
    }

    #[test]
    fn test_simple_tree() {
        let mut doc = sentence(&[
            ("He", "PRP"),
            ("founded", "VBD"),
            ("it", "PRP"),
            ("in", "IN"),
            ("1998", "CD"),
            (".", "."),
        ]);
        DependencyParser::new(ModelSet::default()).run(&mut doc).unwrap();

        assert_eq!(
            heads(&doc),
            vec![
                row("He", 2, "SBJ"),
                row("founded", 0, "ROOT"),
                row("it", 2, "OBJ"),
                row("in", 2, "ADV"),
                row("1998", 4, "PMOD"),
                row(".", 2, "P"),
            ]
        );
        assert_eq!(doc.annotations().of_type(&AnnotationType::DependencyArc).count(), 5);
    }

    #[test]
    fn test_noun_runs_and_modifiers() {
        let mut doc = sentence(&[
            ("John", "NNP"),
            ("Smith", "NNP"),
            ("works", "VBZ"),
            ("at", "IN"),
            ("the", "DT"),
            ("Acme", "NNP"),
            ("Corp", "NNP"),
        ]);
        DependencyParser::new(ModelSet::default()).run(&mut doc).unwrap();

        assert_eq!(
            heads(&doc),
            vec![
                row("John", 2, "NMOD"),
                row("Smith", 3, "SBJ"),
                row("works", 0, "ROOT"),
                row("at", 3, "ADV"),
                row("the", 7, "NMOD"),
                row("Acme", 7, "NMOD"),
                row("Corp", 4, "PMOD"),
            ]
        );
    }

    #[test]
    fn test_single_root_per_sentence() {
        let mut doc = sentence(&[
            ("The", "DT"),
            ("cars", "NNS"),
            ("will", "MD"),
            ("stop", "VB"),
            ("quickly", "RB"),
            ("and", "CC"),
            ("leave", "VB"),
        ]);
        DependencyParser::new(ModelSet::default()).run(&mut doc).unwrap();

        let rows = heads(&doc);
        assert_eq!(rows.iter().filter(|(_, head, _)| *head == 0).count(), 1);
        assert_eq!(rows[3], row("stop", 0, "ROOT"));
        assert_eq!(rows[2], row("will", 4, "VC"));
        assert_eq!(rows[4], row("quickly", 4, "ADV"));
    }

    #[test]
    fn test_model_overrides() {
        let models = ModelSet::from_parts(
            HashMap::from([("went".to_string(), "go".to_string())]),
            HashMap::from([("like".to_string(), "IN".to_string())]),
            vec![LabelRule {
                dependent: "IN".into(),
                head: "VB".into(),
                label: "LOC".into(),
            }],
        );
        let mut doc = sentence(&[("She", "PRP"), ("went", "VBD"), ("like", "VB"), ("him", "PRP")]);
        DependencyParser::new(models).run(&mut doc).unwrap();

        let tokens: Vec<_> = doc.annotations().of_type(&AnnotationType::Token).collect();
        assert_eq!(tokens[1].feature_str(feature::LEMMA), Some("go"));
        assert_eq!(tokens[2].feature_str(feature::POS), Some("IN"));
        assert_eq!(tokens[2].feature_str(feature::DEPREL), Some("LOC"));
    }

    #[test]
    fn test_arcs_reference_tokens() {
        let mut doc = sentence(&[("Dogs", "NNS"), ("bark", "VBP")]);
        DependencyParser::new(ModelSet::default()).run(&mut doc).unwrap();

        let arc = doc
            .annotations()
            .of_type(&AnnotationType::DependencyArc)
            .next()
            .unwrap();
        let governor = arc.feature(arc::GOVERNOR).and_then(|v| v.as_ids()).unwrap()[0];
        let dependent = arc.feature(arc::DEPENDENT).and_then(|v| v.as_ids()).unwrap()[0];
        assert_eq!(doc.text_of(doc.annotations().get(governor).unwrap()), "bark");
        assert_eq!(doc.text_of(doc.annotations().get(dependent).unwrap()), "Dogs");
        assert_eq!(arc.feature_str(arc::LABEL), Some("SBJ"));
        // the arc sits on its dependent
        assert_eq!(arc.span, Span::new(0, 4));
    }
}
