//! List lookup over token sequences

use super::tokenizer::scan;
use super::{annotate, feature, tokens_within};
use crate::language::GazetteerList;
use gloss_core::{
    features, AnnotationType, Document, FeatureMap, Span, Stage, StageDescriptor, StageError,
};
use std::collections::HashMap;

/// Token-level trie node
#[derive(Debug, Default, Clone)]
struct Node {
    children: HashMap<String, usize>,
    /// Lists whose entries end here
    lists: Vec<usize>,
}

/// Joins the major and minor types of every list an entry belongs to
pub const LIST_SEPARATOR: &str = ";";

/// Marks token sequences found in gazetteer lists with `Lookup` annotations
///
/// Entries are tokenised the same way as documents and matched token by
/// token, case-sensitively, scanning left to right and taking the longest
/// entry at each position. Matches never overlap and never span a line
/// break. An entry found in several lists yields one `Lookup` whose
/// `majorType` and `minorType` list every one of them, separated by
/// [`LIST_SEPARATOR`] and aligned by position.
#[derive(Debug, Clone)]
pub struct Gazetteer {
    descriptor: StageDescriptor,
    nodes: Vec<Node>,
    lists: Vec<(String, Option<String>)>,
}

impl Gazetteer {
    /// Stage name
    pub const NAME: &'static str = "gazetteer";

    /// Compile lists into a trie
    pub fn new(lists: &[GazetteerList]) -> Self {
        let descriptor = StageDescriptor::new(Self::NAME)
            .requires([AnnotationType::Token.layer()])
            .produces([
                AnnotationType::Lookup.layer(),
                AnnotationType::Lookup.feature(feature::MAJOR_TYPE),
                AnnotationType::Lookup.feature(feature::MINOR_TYPE),
            ]);

        let mut gazetteer = Self {
            descriptor,
            nodes: vec![Node::default()],
            lists: Vec::with_capacity(lists.len()),
        };

        for list in lists {
            let index = gazetteer.lists.len();
            gazetteer.lists.push((list.major.clone(), list.minor.clone()));
            for entry in &list.entries {
                gazetteer.insert(entry, index);
            }
        }

        log::debug!(
            "{}: {} lists, {} trie nodes",
            Self::NAME,
            gazetteer.lists.len(),
            gazetteer.nodes.len()
        );
        gazetteer
    }

    fn insert(&mut self, entry: &str, list: usize) {
        let words = entry_words(entry);
        if words.is_empty() {
            return;
        }

        let mut node = 0;
        for word in words {
            node = match self.nodes[node].children.get(&word) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].children.insert(word, child);
                    child
                }
            };
        }

        if !self.nodes[node].lists.contains(&list) {
            self.nodes[node].lists.push(list);
        }
    }

    /// Longest entry starting at `words[0]`: token count and its lists
    fn longest_match<'a>(&'a self, words: &[&str], breaks: &[bool]) -> Option<(usize, &'a [usize])> {
        let mut node = 0;
        let mut best = None;

        for (i, word) in words.iter().enumerate() {
            if i > 0 && breaks[i] {
                break;
            }
            match self.nodes[node].children.get(*word) {
                Some(&child) => node = child,
                None => break,
            }
            if !self.nodes[node].lists.is_empty() {
                best = Some((i + 1, self.nodes[node].lists.as_slice()));
            }
        }

        best
    }

    fn lookup_features(&self, lists: &[usize]) -> FeatureMap {
        let (majors, minors): (Vec<&str>, Vec<&str>) = lists
            .iter()
            .map(|&list| {
                let (major, minor) = &self.lists[list];
                (major.as_str(), minor.as_deref().unwrap_or(""))
            })
            .unzip();

        let mut features = features! { feature::MAJOR_TYPE => majors.join(LIST_SEPARATOR) };
        if minors.iter().any(|m| !m.is_empty()) {
            features.insert(
                feature::MINOR_TYPE.to_string(),
                minors.join(LIST_SEPARATOR).into(),
            );
        }
        features
    }
}

fn entry_words(entry: &str) -> Vec<String> {
    scan(entry)
        .into_iter()
        .filter(|t| !t.kind.is_space())
        .map(|t| entry.chars().skip(t.span.start).take(t.span.len()).collect())
        .collect()
}

impl Stage for Gazetteer {
    fn descriptor(&self) -> &StageDescriptor {
        &self.descriptor
    }

    fn run(&self, document: &mut Document) -> Result<(), StageError> {
        let tokens = tokens_within(document, Span::new(0, document.char_len()));
        let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();

        // breaks[i]: a line break separates token i from token i - 1
        let breaks: Vec<bool> = tokens
            .iter()
            .enumerate()
            .map(|(i, token)| {
                i > 0
                    && document
                        .slice(Span::new(tokens[i - 1].span.end, token.span.start))
                        .is_some_and(|gap| gap.contains('\n'))
            })
            .collect();

        let mut found = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            match self.longest_match(&words[i..], &breaks[i..]) {
                Some((len, lists)) => {
                    let span = Span::new(tokens[i].span.start, tokens[i + len - 1].span.end);
                    found.push((span, self.lookup_features(lists)));
                    i += len;
                }
                None => i += 1,
            }
        }

        for (span, features) in found {
            annotate(document, Self::NAME, AnnotationType::Lookup, span, features)?;
        }

        Ok(())
    }
}
