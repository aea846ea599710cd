//! Language resources shared by the built-in stages
//!
//! Word lists, the closed-class lexicon, suffix heuristics and gazetteer
//! lists are kept in a TOML file embedded at build time. Extra gazetteer
//! lists can be loaded from disk with the same schema.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

const ENGLISH: &str = include_str!("../configs/english.toml");

/// Root of a language resource file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Language identity
    pub metadata: Metadata,
    /// Abbreviations by category, periods included
    #[serde(default)]
    pub abbreviations: BTreeMap<String, Vec<String>>,
    /// Words that may open a sentence after an abbreviation
    #[serde(default)]
    pub sentence_starters: BTreeMap<String, Vec<String>>,
    /// Penn tag to lower-case words
    #[serde(default)]
    pub lexicon: BTreeMap<String, Vec<String>>,
    /// Suffix heuristics for open-class words
    #[serde(default, rename = "suffix")]
    pub suffixes: Vec<SuffixRule>,
    /// Inflected form to root
    #[serde(default)]
    pub irregular: BTreeMap<String, String>,
    /// Built-in gazetteer lists
    #[serde(default)]
    pub gazetteer: Vec<GazetteerList>,
}

/// Language metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// ISO code, e.g. `en`
    pub code: String,
    /// Display name
    pub name: String,
}

/// Tag guessed for open-class words ending in `suffix`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixRule {
    /// Word ending
    pub suffix: String,
    /// Penn tag
    pub tag: String,
}

/// One gazetteer list: entries sharing a major and minor type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GazetteerList {
    /// `majorType` of the lookups
    pub major: String,
    /// `minorType` of the lookups
    #[serde(default)]
    pub minor: Option<String>,
    /// Entries, matched token by token
    pub entries: Vec<String>,
}

/// File holding only gazetteer lists
#[derive(Debug, Deserialize)]
struct GazetteerFile {
    #[serde(default)]
    gazetteer: Vec<GazetteerList>,
}

/// Compiled lookup tables
#[derive(Debug, Clone)]
pub struct LanguageRules {
    code: String,
    abbreviations: HashSet<String>,
    sentence_starters: HashSet<String>,
    tags: HashMap<String, String>,
    suffixes: Vec<SuffixRule>,
    irregular: HashMap<String, String>,
    gazetteer: Vec<GazetteerList>,
}

impl LanguageRules {
    /// Built-in English resources
    pub fn english() -> Result<Self> {
        Self::from_toml("en", ENGLISH)
    }

    /// Parse and compile a resource file
    pub fn from_toml(code: &str, source: &str) -> Result<Self> {
        let config: LanguageConfig = toml::from_str(source).map_err(|e| {
            PipelineError::Configuration(format!("failed to parse {code} resources: {e}"))
        })?;
        Ok(Self::from_config(config))
    }

    /// Compile a parsed configuration
    pub fn from_config(config: LanguageConfig) -> Self {
        let abbreviations = config
            .abbreviations
            .into_values()
            .flatten()
            .map(|a| a.trim_end_matches('.').to_lowercase())
            .collect();

        let sentence_starters = config.sentence_starters.into_values().flatten().collect();

        let mut tags = HashMap::new();
        for (tag, words) in config.lexicon {
            for word in words {
                tags.entry(word.to_lowercase()).or_insert_with(|| tag.clone());
            }
        }

        let mut suffixes = config.suffixes;
        suffixes.sort_by(|a, b| b.suffix.len().cmp(&a.suffix.len()));

        Self {
            code: config.metadata.code,
            abbreviations,
            sentence_starters,
            tags,
            suffixes,
            irregular: config.irregular.into_iter().collect(),
            gazetteer: config.gazetteer,
        }
    }

    /// Language code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// True if `word` may precede a non-final period
    pub fn is_abbreviation(&self, word: &str) -> bool {
        self.abbreviations.contains(&word.to_lowercase())
    }

    /// True if `word` typically opens a sentence
    pub fn is_sentence_starter(&self, word: &str) -> bool {
        self.sentence_starters.contains(word)
    }

    /// Closed-class tag for a word, case-insensitive
    pub fn closed_class_tag(&self, word: &str) -> Option<&str> {
        self.tags.get(&word.to_lowercase()).map(String::as_str)
    }

    /// Tag guessed from the longest matching suffix
    ///
    /// The stem left after removing the suffix must keep at least three
    /// characters, so `red` or `thing` are not read as inflections.
    pub fn suffix_tag(&self, word: &str) -> Option<&str> {
        let lower = word.to_lowercase();
        self.suffixes
            .iter()
            .find(|rule| {
                lower.ends_with(&rule.suffix)
                    && lower.chars().count() >= rule.suffix.chars().count() + 3
            })
            .map(|rule| rule.tag.as_str())
    }

    /// Root of an irregular form
    pub fn irregular_root(&self, word: &str) -> Option<&str> {
        self.irregular.get(&word.to_lowercase()).map(String::as_str)
    }

    /// All gazetteer lists, built-in first
    pub fn gazetteer_lists(&self) -> &[GazetteerList] {
        &self.gazetteer
    }

    /// Append lists loaded from elsewhere
    pub fn extend_gazetteer(&mut self, lists: impl IntoIterator<Item = GazetteerList>) {
        self.gazetteer.extend(lists);
    }
}

/// Load gazetteer lists from a TOML file of `[[gazetteer]]` tables
pub fn load_gazetteer_lists(path: &Path) -> Result<Vec<GazetteerList>> {
    let content = fs::read_to_string(path).map_err(|e| {
        PipelineError::Configuration(format!(
            "failed to read gazetteer lists {}: {e}",
            path.display()
        ))
    })?;

    let file: GazetteerFile = toml::from_str(&content).map_err(|e| {
        PipelineError::Configuration(format!(
            "failed to parse gazetteer lists {}: {e}",
            path.display()
        ))
    })?;

    Ok(file.gazetteer)
}
