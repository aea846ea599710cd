//! Orthographic coreference between named-entity mentions
//!
//! Mentions are visited once, in document order. Each has a normalised key
//! (lower case, punctuation removed) and a few variant keys derived from its
//! shape: the name without company designators, an acronym of multi-word
//! names, a person's surname. A mention joins an earlier chain when
//!
//! - its key equals a key already seen (`IBM` ... `IBM`),
//! - its key equals a variant of an earlier mention (`Smith` after
//!   `John Smith`), or
//! - one of its variants equals a key already seen
//!   (`International Business Machines` after `IBM`), or
//! - its designator-stripped name equals that of an earlier organisation or
//!   location (`Acme Corporation` after `Acme Corp.`).
//!
//! Matching never crosses entity kinds. When a mention matches several
//! chains they are merged in the order the matches were found; the first
//! chain keeps its representative.
//!
//! [`VariantIndex`] turns the keys of known mentions around so that running
//! text can be searched for repeats nobody annotated yet.

use gloss_core::AnnotationId;
use smallvec::SmallVec;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Words ignored when building acronyms
const ACRONYM_STOP_WORDS: &[&str] = &["of", "the", "and", "for", "de", "la", "on"];

/// Entity kinds that get variant keys
const PERSON: &str = "Person";
const ORGANIZATION: &str = "Organization";
const LOCATION: &str = "Location";

type Keys = SmallVec<[String; 4]>;

/// One named-entity mention, in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mention<'a> {
    /// Annotation id of the entity
    pub id: AnnotationId,
    /// Covered text
    pub text: &'a str,
    /// Entity kind, e.g. `Organization`
    pub kind: &'a str,
}

/// Mentions asserted to denote the same referent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    /// Entity kind shared by every member
    pub kind: String,
    /// First mention of the chain that started it
    pub representative: AnnotationId,
    /// All members in document order, representative included
    pub members: Vec<AnnotationId>,
}

/// Chain under construction; members are mention positions
#[derive(Debug)]
struct Pending {
    representative: usize,
    members: Vec<usize>,
}

/// Keys of one mention
#[derive(Debug)]
struct MentionKeys {
    /// Normalised full text
    name: String,
    /// Name without trailing designators, when any were stripped
    core: Option<String>,
    /// Every other key, `core` included
    variants: Keys,
}

impl MentionKeys {
    fn iter(&self) -> impl Iterator<Item = &String> {
        std::iter::once(&self.name).chain(self.variants.iter())
    }
}

/// Which chain a mention ended up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Chain(usize),
    Alone(usize),
}

/// The mention a key in [`VariantIndex`] belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOwner {
    /// Position of the first mention carrying the key
    pub mention: usize,
    /// Entity kind of that mention
    pub kind: String,
    group: Group,
}

/// Names and variant keys of known mentions
///
/// A key claimed by mentions of different chains or kinds (two people
/// sharing a surname) is ambiguous and never reported.
#[derive(Debug, Clone, Default)]
pub struct VariantIndex {
    keys: HashMap<String, Option<KeyOwner>>,
    max_words: usize,
}

impl VariantIndex {
    /// Owner of the key `text` normalises to
    pub fn get(&self, text: &str) -> Option<&KeyOwner> {
        self.keys.get(&normalize(text))?.as_ref()
    }

    /// Word count of the longest key
    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// True when no key can match
    pub fn is_empty(&self) -> bool {
        self.keys.values().all(Option::is_none)
    }
}

/// Deterministic orthographic matcher
#[derive(Debug, Clone, Default)]
pub struct OrthoMatcher {
    designators: HashSet<String>,
    include_singletons: bool,
}

impl OrthoMatcher {
    /// Matcher that strips the given company designators (`Corp`, `Inc.`)
    pub fn new<I, S>(designators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let designators = designators
            .into_iter()
            .map(|d| normalize(d.as_ref()))
            .filter(|d| !d.is_empty())
            .collect();
        Self {
            designators,
            include_singletons: false,
        }
    }

    /// Also report chains with a single member
    pub fn include_singletons(mut self, include: bool) -> Self {
        self.include_singletons = include;
        self
    }

    /// Normalised key followed by variant keys; empty if the text has no letters or digits
    pub fn candidate_keys(&self, text: &str, kind: &str) -> Keys {
        self.keys(text, kind)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn keys(&self, text: &str, kind: &str) -> Option<MentionKeys> {
        let name = normalize(text);
        if name.is_empty() {
            return None;
        }

        let words: Vec<&str> = name.split(' ').collect();
        let mut core = None;
        let mut variants = Keys::new();
        let mut push = |candidate: String| {
            if !candidate.is_empty() && candidate != name && !variants.contains(&candidate) {
                variants.push(candidate);
            }
        };

        match kind {
            ORGANIZATION | LOCATION => {
                let mut stripped = words.as_slice();
                while let Some((last, rest)) = stripped.split_last() {
                    if rest.is_empty() || !self.designators.contains(*last) {
                        break;
                    }
                    stripped = rest;
                }
                if stripped.len() < words.len() {
                    let joined = stripped.join(" ");
                    core = Some(joined.clone());
                    push(joined);
                }
                push(acronym(stripped));
                push(acronym(&words));
            }
            PERSON if words.len() >= 2 => {
                if let Some(last) = words.last() {
                    push((*last).to_string());
                }
            }
            _ => {}
        }

        Some(MentionKeys {
            name,
            core,
            variants,
        })
    }

    /// Index the names and variants of person, organisation and location mentions
    ///
    /// `chains` is what [`OrthoMatcher::resolve`] returned for the same
    /// mentions; it decides whether two mentions sharing a key agree.
    pub fn variant_index(&self, mentions: &[Mention<'_>], chains: &[Chain]) -> VariantIndex {
        let chain_of: HashMap<AnnotationId, usize> = chains
            .iter()
            .enumerate()
            .flat_map(|(c, chain)| chain.members.iter().map(move |&id| (id, c)))
            .collect();

        let mut index = VariantIndex::default();
        for (position, mention) in mentions.iter().enumerate() {
            if !matches!(mention.kind, PERSON | ORGANIZATION | LOCATION) {
                continue;
            }
            let Some(keys) = self.keys(mention.text, mention.kind) else {
                continue;
            };
            let group = chain_of
                .get(&mention.id)
                .map_or(Group::Alone(position), |&c| Group::Chain(c));

            for key in keys.iter() {
                index.max_words = index.max_words.max(key.split(' ').count());
                match index.keys.entry(key.clone()) {
                    Entry::Vacant(slot) => {
                        slot.insert(Some(KeyOwner {
                            mention: position,
                            kind: mention.kind.to_string(),
                            group,
                        }));
                    }
                    Entry::Occupied(mut slot) => {
                        let agrees = slot
                            .get()
                            .as_ref()
                            .is_some_and(|owner| owner.kind == mention.kind && owner.group == group);
                        if !agrees {
                            slot.insert(None);
                        }
                    }
                }
            }
        }
        index
    }

    /// Group mentions into chains
    pub fn resolve(&self, mentions: &[Mention<'_>]) -> Vec<Chain> {
        let mut names: HashMap<(String, String), usize> = HashMap::new();
        let mut variants: HashMap<(String, String), usize> = HashMap::new();
        let mut chains: Vec<Option<Pending>> = Vec::new();

        for (position, mention) in mentions.iter().enumerate() {
            let keys = self.keys(mention.text, mention.kind);
            let kind = mention.kind.to_string();
            let slot = |key: &String| (kind.clone(), key.clone());

            let mut matched: SmallVec<[usize; 4]> = SmallVec::new();
            if let Some(keys) = &keys {
                note(names.get(&slot(&keys.name)), &mut matched);
                note(variants.get(&slot(&keys.name)), &mut matched);
                for variant in &keys.variants {
                    note(names.get(&slot(variant)), &mut matched);
                }
                // surnames are never compared with each other, cores are
                if let Some(core) = &keys.core {
                    note(variants.get(&slot(core)), &mut matched);
                }
            }

            let joined = !matched.is_empty();
            let target = match matched.first() {
                Some(&target) => {
                    for &other in &matched[1..] {
                        merge(&mut chains, &mut names, &mut variants, target, other);
                    }
                    if let Some(chain) = chains[target].as_mut() {
                        chain.members.push(position);
                    }
                    target
                }
                None => {
                    chains.push(Some(Pending {
                        representative: position,
                        members: vec![position],
                    }));
                    chains.len() - 1
                }
            };

            // a single word joining a chain is a short form, not a name of its own
            if let Some(keys) = &keys {
                let short_form = joined && !keys.name.contains(' ');
                let table = if short_form { &mut variants } else { &mut names };
                table.entry(slot(&keys.name)).or_insert(target);
                for variant in &keys.variants {
                    variants.entry(slot(variant)).or_insert(target);
                }
            }
        }

        chains
            .into_iter()
            .flatten()
            .filter(|chain| self.include_singletons || chain.members.len() > 1)
            .map(|mut chain| {
                chain.members.sort_unstable();
                let representative = &mentions[chain.representative];
                Chain {
                    kind: representative.kind.to_string(),
                    representative: representative.id,
                    members: chain.members.iter().map(|&p| mentions[p].id).collect(),
                }
            })
            .collect()
    }
}

fn note(chain: Option<&usize>, matched: &mut SmallVec<[usize; 4]>) {
    if let Some(&chain) = chain {
        if !matched.contains(&chain) {
            matched.push(chain);
        }
    }
}

/// Fold chain `other` into `target` and re-point its keys
fn merge(
    chains: &mut [Option<Pending>],
    names: &mut HashMap<(String, String), usize>,
    variants: &mut HashMap<(String, String), usize>,
    target: usize,
    other: usize,
) {
    let Some(absorbed) = chains[other].take() else {
        return;
    };
    if let Some(chain) = chains[target].as_mut() {
        chain.members.extend(absorbed.members);
    }
    for chain in names.values_mut().chain(variants.values_mut()) {
        if *chain == other {
            *chain = target;
        }
    }
}

/// Lower case, punctuation dropped, whitespace and hyphens collapsed to one space
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_space = true;
        }
    }

    out
}

/// Initials of the content words of a multi-word name
fn acronym(words: &[&str]) -> String {
    let content: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| !ACRONYM_STOP_WORDS.contains(w))
        .collect();
    if content.len() < 2 {
        return String::new();
    }
    content.iter().filter_map(|w| w.chars().next()).collect()
}
