//! Rule cascade for named entities
//!
//! Every rule is tried at every token of a sentence. The candidate covering
//! the most tokens wins, ties go to the earlier rule, and scanning resumes
//! after the chosen entity, so entities never overlap.

use super::{annotate, feature, sentence_spans, tokens_within, TokenInfo, LIST_SEPARATOR};
use crate::error::PipelineError;
use gloss_core::{features, AnnotationType, Document, Span, Stage, StageDescriptor, StageError};
use regex::Regex;

/// Entity classes produced by the transducer
pub mod kind {
    /// People
    pub const PERSON: &str = "Person";
    /// Companies and institutions
    pub const ORGANIZATION: &str = "Organization";
    /// Places
    pub const LOCATION: &str = "Location";
    /// Calendar expressions
    pub const DATE: &str = "Date";
    /// Amounts of currency
    pub const MONEY: &str = "Money";
    /// Percentages
    pub const PERCENT: &str = "Percent";
}

/// A `Lookup` aligned to token positions
#[derive(Debug, Clone)]
struct TokenLookup {
    /// One past the last token covered
    end: usize,
    major: String,
    minor: Option<String>,
}

/// A sentence prepared for matching
struct Sentence {
    tokens: Vec<TokenInfo>,
    /// Lookups keyed by the token they start at
    lookups: Vec<Vec<TokenLookup>>,
}

impl Sentence {
    /// End of the longest lookup with `major` starting at token `i`
    fn lookup_end(&self, i: usize, major: &str) -> Option<usize> {
        self.lookups
            .get(i)?
            .iter()
            .filter(|l| l.major == major)
            .map(|l| l.end)
            .max()
    }

    fn lookup_end_minor(&self, i: usize, major: &str, minor: &str) -> Option<usize> {
        self.lookups
            .get(i)?
            .iter()
            .filter(|l| l.major == major && l.minor.as_deref() == Some(minor))
            .map(|l| l.end)
            .max()
    }

    fn is_proper(&self, i: usize) -> bool {
        self.tokens
            .get(i)
            .is_some_and(|t| t.is_capitalised() && t.category().starts_with("NNP"))
    }

    fn is_number(&self, i: usize) -> bool {
        self.tokens.get(i).is_some_and(TokenInfo::is_number)
    }

    fn text(&self, i: usize) -> &str {
        self.tokens.get(i).map_or("", |t| t.text.as_str())
    }

    /// Tokens `i` and `i + 1` touch with no space between
    fn adjacent(&self, i: usize) -> bool {
        match (self.tokens.get(i), self.tokens.get(i + 1)) {
            (Some(a), Some(b)) => a.span.end == b.span.start,
            _ => false,
        }
    }
}

/// One rule firing: entity covers tokens `start..end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    end: usize,
    kind: &'static str,
    rule: &'static str,
}

/// Produces `NamedEntity` annotations from tokens, tags and lookups
#[derive(Debug, Clone)]
pub struct NeTransducer {
    descriptor: StageDescriptor,
    year: Regex,
    numeric_date: Regex,
}

impl NeTransducer {
    /// Stage name
    pub const NAME: &'static str = "ne-transducer";

    /// Create the transducer
    pub fn new() -> crate::error::Result<Self> {
        let descriptor = StageDescriptor::new(Self::NAME)
            .requires([
                AnnotationType::Token.feature(feature::CATEGORY),
                AnnotationType::Lookup.layer(),
                AnnotationType::Sentence.layer(),
            ])
            .produces([
                AnnotationType::NamedEntity.layer(),
                AnnotationType::NamedEntity.feature(feature::KIND),
                AnnotationType::NamedEntity.feature(feature::RULE),
            ]);

        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| PipelineError::Configuration(e.to_string()))
        };

        Ok(Self {
            descriptor,
            year: compile(r"^(1[0-9]|20)[0-9]{2}$")?,
            numeric_date: compile(r"^[0-9]{1,4}([-/])[0-9]{1,2}([-/])[0-9]{1,4}$")?,
        })
    }

    fn prepare(document: &Document, span: Span) -> Sentence {
        let tokens = tokens_within(document, span);
        let mut lookups = vec![Vec::new(); tokens.len()];

        for lookup in document.annotations().within(&AnnotationType::Lookup, span) {
            let start = tokens.iter().position(|t| t.span.start == lookup.span.start);
            let end = tokens.iter().position(|t| t.span.end == lookup.span.end);
            let (Some(start), Some(end)) = (start, end) else {
                continue;
            };

            // one entry per list the lookup was found in
            let majors = lookup.feature_str(feature::MAJOR_TYPE).unwrap_or_default();
            let mut minors = lookup
                .feature_str(feature::MINOR_TYPE)
                .map(|m| m.split(LIST_SEPARATOR));
            for major in majors.split(LIST_SEPARATOR) {
                let minor = minors
                    .as_mut()
                    .and_then(Iterator::next)
                    .filter(|m| !m.is_empty());
                lookups[start].push(TokenLookup {
                    end: end + 1,
                    major: major.to_string(),
                    minor: minor.map(str::to_string),
                });
            }
        }

        Sentence { tokens, lookups }
    }

    /// Proper nouns ending in a company designator: `Acme Corp.`
    fn organisation_designator(s: &Sentence, i: usize) -> Option<Candidate> {
        if !s.is_proper(i) {
            return None;
        }
        let mut best = None;
        let mut j = i + 1;
        while j < s.tokens.len() {
            if let Some(end) = s.lookup_end(j, "org_key") {
                best = Some(end);
            }
            if !s.is_proper(j) {
                break;
            }
            j += 1;
        }
        best.map(|end| Candidate {
            end,
            kind: kind::ORGANIZATION,
            rule: "OrgDesignator",
        })
    }

    /// Whole-list matches for organisations and locations
    fn listed(s: &Sentence, i: usize) -> Option<Candidate> {
        let org = s.lookup_end(i, "organization").map(|end| Candidate {
            end,
            kind: kind::ORGANIZATION,
            rule: "OrgList",
        });
        let location = s.lookup_end(i, "location").map(|end| Candidate {
            end,
            kind: kind::LOCATION,
            rule: "LocationList",
        });
        longest([org, location])
    }

    /// Title or known first name followed by capitalised words
    fn person(s: &Sentence, i: usize) -> Option<Candidate> {
        let proper_run = |from: usize| {
            let mut end = from;
            while s.is_proper(end) && s.lookup_end(end, "org_key").is_none() {
                end += 1;
            }
            end
        };

        if let Some(after_title) = s.lookup_end(i, "title") {
            let end = proper_run(after_title);
            if end > after_title {
                return Some(Candidate {
                    end,
                    kind: kind::PERSON,
                    rule: "TitledPerson",
                });
            }
        }

        if s.tokens.get(i).is_some_and(TokenInfo::is_capitalised) {
            if let Some(after_first) = s.lookup_end(i, "person_first") {
                return Some(Candidate {
                    end: proper_run(after_first),
                    kind: kind::PERSON,
                    rule: "FirstName",
                });
            }
        }

        None
    }

    /// Month names with optional day and year, weekdays, years, numeric dates
    fn date(&self, s: &Sentence, i: usize) -> Option<Candidate> {
        if let Some(mut end) = s.lookup_end_minor(i, "date", "month") {
            if s.is_number(end) {
                end += 1;
                if s.text(end) == "," && self.year.is_match(s.text(end + 1)) {
                    end += 2;
                }
            }
            return Some(Candidate {
                end,
                kind: kind::DATE,
                rule: "MonthDate",
            });
        }

        if let Some(end) = s.lookup_end_minor(i, "date", "day") {
            return Some(Candidate {
                end,
                kind: kind::DATE,
                rule: "DayName",
            });
        }

        if !s.is_number(i) {
            return None;
        }

        if (0..4).all(|k| s.adjacent(i + k)) {
            let joined: String = (i..i + 5).map(|k| s.text(k)).collect();
            if self.numeric_date.is_match(&joined) {
                return Some(Candidate {
                    end: i + 5,
                    kind: kind::DATE,
                    rule: "NumericDate",
                });
            }
        }

        self.year.is_match(s.text(i)).then_some(Candidate {
            end: i + 1,
            kind: kind::DATE,
            rule: "Year",
        })
    }

    /// Currency before or after an amount
    fn money(s: &Sentence, i: usize) -> Option<Candidate> {
        let scale = |end: usize| {
            if matches!(s.text(end), "million" | "billion" | "thousand") {
                end + 1
            } else {
                end
            }
        };

        if let Some(after) = s.lookup_end_minor(i, "currency_unit", "pre_amount") {
            if s.is_number(after) {
                return Some(Candidate {
                    end: scale(after + 1),
                    kind: kind::MONEY,
                    rule: "CurrencyAmount",
                });
            }
        }

        if s.is_number(i) {
            let unit_at = scale(i + 1);
            if let Some(end) = s.lookup_end_minor(unit_at, "currency_unit", "post_amount") {
                return Some(Candidate {
                    end,
                    kind: kind::MONEY,
                    rule: "AmountCurrency",
                });
            }
        }

        None
    }

    fn percent(s: &Sentence, i: usize) -> Option<Candidate> {
        if !s.is_number(i) {
            return None;
        }
        s.lookup_end(i + 1, "percent").map(|end| Candidate {
            end,
            kind: kind::PERCENT,
            rule: "Percent",
        })
    }

    fn best_at(&self, s: &Sentence, i: usize) -> Option<Candidate> {
        longest([
            Self::organisation_designator(s, i),
            Self::listed(s, i),
            Self::person(s, i),
            Self::money(s, i),
            Self::percent(s, i),
            self.date(s, i),
        ])
    }
}

/// Longest candidate, the earliest on ties
fn longest<const N: usize>(candidates: [Option<Candidate>; N]) -> Option<Candidate> {
    candidates
        .into_iter()
        .flatten()
        .fold(None, |best: Option<Candidate>, c| match best {
            Some(b) if b.end >= c.end => Some(b),
            _ => Some(c),
        })
}

impl Stage for NeTransducer {
    fn descriptor(&self) -> &StageDescriptor {
        &self.descriptor
    }

    fn run(&self, document: &mut Document) -> Result<(), StageError> {
        let mut found = Vec::new();

        for span in sentence_spans(document) {
            let sentence = Self::prepare(document, span);
            let mut i = 0;
            while i < sentence.tokens.len() {
                match self.best_at(&sentence, i) {
                    Some(candidate) if candidate.end > i => {
                        let entity = Span::new(
                            sentence.tokens[i].span.start,
                            sentence.tokens[candidate.end - 1].span.end,
                        );
                        found.push((entity, candidate));
                        i = candidate.end;
                    }
                    _ => i += 1,
                }
            }
        }

        log::trace!("{}: {} entities in '{}'", Self::NAME, found.len(), document.id());
        for (span, candidate) in found {
            annotate(
                document,
                Self::NAME,
                AnnotationType::NamedEntity,
                span,
                features! {
                    feature::KIND => candidate.kind,
                    feature::RULE => candidate.rule,
                },
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageRules;
    use crate::stages::{Gazetteer, PosTagger, SentenceSplitter, Tokenizer};
    use std::sync::Arc;

    fn entities(text: &str) -> Vec<(String, String)> {
        let rules = Arc::new(LanguageRules::english().unwrap());
        let mut doc = Document::new("d", text);
        Tokenizer::new().run(&mut doc).unwrap();
        Gazetteer::new(rules.gazetteer_lists()).run(&mut doc).unwrap();
        SentenceSplitter::new(rules.clone()).run(&mut doc).unwrap();
        PosTagger::new(rules).run(&mut doc).unwrap();
        NeTransducer::new().unwrap().run(&mut doc).unwrap();

        doc.annotations()
            .of_type(&AnnotationType::NamedEntity)
            .map(|e| {
                (
                    doc.text_of(e).to_string(),
                    e.feature_str(feature::KIND).unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    fn pair(text: &str, kind: &str) -> (String, String) {
        (text.to_string(), kind.to_string())
    }

    #[test]
    fn test_running_example() {
        assert_eq!(
            entities("John Smith works at Acme Corp. He founded it in 1998."),
            vec![
                pair("John Smith", kind::PERSON),
                pair("Acme Corp.", kind::ORGANIZATION),
                pair("1998", kind::DATE),
            ]
        );
    }

    #[test]
    fn test_titles_and_locations() {
        assert_eq!(
            entities("Dr. Watson flew to New York on Monday."),
            vec![
                pair("Dr. Watson", kind::PERSON),
                pair("New York", kind::LOCATION),
                pair("Monday", kind::DATE),
            ]
        );
    }

    #[test]
    fn test_money_and_percent() {
        assert_eq!(
            entities("Sales rose 5 percent to $30 million in March 2020."),
            vec![
                pair("5 percent", kind::PERCENT),
                pair("$30 million", kind::MONEY),
                pair("March 2020", kind::DATE),
            ]
        );
    }

    #[test]
    fn test_listed_organisation() {
        assert_eq!(
            entities("IBM hired staff."),
            vec![pair("IBM", kind::ORGANIZATION)]
        );
    }

    #[test]
    fn test_numeric_date() {
        assert_eq!(
            entities("Filed on 2024-01-15 by staff."),
            vec![pair("2024-01-15", kind::DATE)]
        );
    }
}
