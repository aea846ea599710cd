//! Rule-based sentence splitting

use super::{annotate, feature};
use crate::language::LanguageRules;
use gloss_core::{features, AnnotationType, Document, Span, Stage, StageDescriptor, StageError};
use std::sync::Arc;

/// Token or whitespace run, in text order
#[derive(Debug, Clone)]
struct Item {
    span: Span,
    text: String,
    space: bool,
}

/// What a terminator does to the sentence it ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Boundary,
    Continue,
}

/// Produces `Sentence` and `Split` annotations
///
/// `!` and `?` always end a sentence. A period ends one unless it follows
/// an abbreviation or a single-letter initial, in which case the next word
/// must be a sentence starter. A blank line always ends a sentence.
///
/// A run of touching terminators (`!!!?`) and any closing brackets or
/// quotes after it form a single `Split`.
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    descriptor: StageDescriptor,
    rules: Arc<LanguageRules>,
}

impl SentenceSplitter {
    /// Stage name
    pub const NAME: &'static str = "sentence-splitter";

    /// Create a splitter using the given abbreviation and starter tables
    pub fn new(rules: Arc<LanguageRules>) -> Self {
        let descriptor = StageDescriptor::new(Self::NAME)
            .requires([AnnotationType::Token.layer()])
            .produces([
                AnnotationType::Sentence.layer(),
                AnnotationType::Split.layer(),
            ]);
        Self { descriptor, rules }
    }

    fn items(document: &Document) -> Vec<Item> {
        let set = document.annotations();
        let mut items: Vec<Item> = set
            .of_type(&AnnotationType::Token)
            .map(|a| (a, false))
            .chain(set.of_type(&AnnotationType::SpaceToken).map(|a| (a, true)))
            .map(|(a, space)| Item {
                span: a.span,
                text: document.text_of(a).to_string(),
                space,
            })
            .collect();
        items.sort_by_key(|item| item.span.start);
        items
    }

    /// Next non-space item after `i`
    fn next_word(items: &[Item], i: usize) -> Option<&Item> {
        items[i + 1..].iter().find(|item| !item.space)
    }

    fn decide(&self, items: &[Item], i: usize) -> Decision {
        let text = items[i].text.as_str();
        if text == "!" || text == "?" {
            return Decision::Boundary;
        }
        if text != "." {
            return Decision::Continue;
        }

        // ellipsis: only the last period may end the sentence
        if items.get(i + 1).is_some_and(|next| next.text == ".") {
            return Decision::Continue;
        }

        let previous = i
            .checked_sub(1)
            .map(|p| &items[p])
            .filter(|p| !p.space && p.span.end == items[i].span.start);

        let abbreviated = previous.is_some_and(|p| {
            self.rules.is_abbreviation(&p.text)
                || (p.text.chars().count() == 1 && p.text.chars().all(char::is_alphabetic))
        });
        if !abbreviated {
            return Decision::Boundary;
        }

        match Self::next_word(items, i) {
            None => Decision::Boundary,
            Some(next) if self.rules.is_sentence_starter(&next.text) => Decision::Boundary,
            Some(_) => Decision::Continue,
        }
    }
}

fn is_terminator(text: &str) -> bool {
    matches!(text, "." | "!" | "?")
}

fn is_closing(text: &str) -> bool {
    matches!(text, ")" | "]" | "\"" | "'" | "\u{201D}" | "\u{2019}" | "\u{00BB}")
}

fn blank_line(text: &str) -> bool {
    text.matches('\n').count() >= 2
}

impl Stage for SentenceSplitter {
    fn descriptor(&self) -> &StageDescriptor {
        &self.descriptor
    }

    fn run(&self, document: &mut Document) -> Result<(), StageError> {
        let items = Self::items(document);
        let mut sentences = Vec::new();
        let mut splits = Vec::new();
        let mut open: Option<Span> = None;

        let mut i = 0;
        while i < items.len() {
            let item = &items[i];

            if item.space {
                if blank_line(&item.text) {
                    if let Some(sentence) = open.take() {
                        sentences.push(sentence);
                    }
                    splits.push((item.span, "external"));
                }
                i += 1;
                continue;
            }

            let sentence = open.get_or_insert(item.span);
            sentence.end = item.span.end;

            if self.decide(&items, i) == Decision::Continue {
                i += 1;
                continue;
            }

            let mut split = item.span;
            i += 1;
            while i < items.len()
                && !items[i].space
                && (is_terminator(&items[i].text) || is_closing(&items[i].text))
            {
                split.end = items[i].span.end;
                i += 1;
            }
            sentence.end = split.end;

            if let Some(sentence) = open.take() {
                sentences.push(sentence);
            }
            splits.push((split, "internal"));
        }

        if let Some(sentence) = open {
            sentences.push(sentence);
        }

        for (span, kind) in splits {
            annotate(
                document,
                Self::NAME,
                AnnotationType::Split,
                span,
                features! { feature::KIND => kind },
            )?;
        }
        for span in sentences {
            annotate(document, Self::NAME, AnnotationType::Sentence, span, features! {})?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::Tokenizer;

    fn sentences(text: &str) -> Vec<String> {
        let mut doc = Document::new("d", text);
        Tokenizer::new().run(&mut doc).unwrap();
        let rules = Arc::new(LanguageRules::english().unwrap());
        SentenceSplitter::new(rules).run(&mut doc).unwrap();
        doc.annotations()
            .of_type(&AnnotationType::Sentence)
            .map(|s| doc.text_of(s).to_string())
            .collect()
    }

    #[test]
    fn test_plain_sentences() {
        assert_eq!(
            sentences("It rained. We stayed in! Did you?"),
            vec!["It rained.", "We stayed in!", "Did you?"]
        );
    }

    #[test]
    fn test_abbreviation_before_starter_splits() {
        assert_eq!(
            sentences("John Smith works at Acme Corp. He founded it in 1998."),
            vec!["John Smith works at Acme Corp.", "He founded it in 1998."]
        );
    }

    #[test]
    fn test_abbreviation_inside_sentence() {
        assert_eq!(
            sentences("Dr. Watson met Mr. Holmes. They talked."),
            vec!["Dr. Watson met Mr. Holmes.", "They talked."]
        );
    }

    #[test]
    fn test_initials_do_not_split() {
        assert_eq!(
            sentences("J. R. Tolkien wrote books."),
            vec!["J. R. Tolkien wrote books."]
        );
    }

    #[test]
    fn test_closing_quote_joins_sentence() {
        assert_eq!(
            sentences("He said \"stop.\" Then left."),
            vec!["He said \"stop.\"", "Then left."]
        );
    }

    #[test]
    fn test_blank_line_is_external_split() {
        let mut doc = Document::new("d", "Heading\n\nBody text");
        Tokenizer::new().run(&mut doc).unwrap();
        SentenceSplitter::new(Arc::new(LanguageRules::english().unwrap()))
            .run(&mut doc)
            .unwrap();

        let found: Vec<_> = doc
            .annotations()
            .of_type(&AnnotationType::Sentence)
            .map(|s| doc.text_of(s).to_string())
            .collect();
        assert_eq!(found, vec!["Heading", "Body text"]);

        let split = doc.annotations().of_type(&AnnotationType::Split).next().unwrap();
        assert_eq!(split.feature_str(feature::KIND), Some("external"));
    }

    #[test]
    fn test_terminator_run_is_one_split() {
        let mut doc = Document::new("d", "Stop!!!? Go now.");
        Tokenizer::new().run(&mut doc).unwrap();
        SentenceSplitter::new(Arc::new(LanguageRules::english().unwrap()))
            .run(&mut doc)
            .unwrap();

        let sentences: Vec<_> = doc
            .annotations()
            .of_type(&AnnotationType::Sentence)
            .map(|s| doc.text_of(s).to_string())
            .collect();
        assert_eq!(sentences, vec!["Stop!!!?", "Go now."]);

        let splits: Vec<_> = doc
            .annotations()
            .of_type(&AnnotationType::Split)
            .map(|s| doc.text_of(s).to_string())
            .collect();
        assert_eq!(splits, vec!["!!!?", "."]);
    }

    #[test]
    fn test_unterminated_text_is_one_sentence() {
        assert_eq!(sentences("no full stop here"), vec!["no full stop here"]);
    }

    #[test]
    fn test_ellipsis() {
        assert_eq!(
            sentences("Wait... Go now."),
            vec!["Wait...", "Go now."]
        );
    }
}
