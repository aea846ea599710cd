//! Annotation type vocabulary and pipeline layers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The registered annotation types
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum AnnotationType {
    /// A word, number, punctuation mark or symbol
    Token,
    /// A run of whitespace or control characters
    SpaceToken,
    /// A gazetteer match
    Lookup,
    /// A sentence
    Sentence,
    /// A sentence terminator or forced break
    Split,
    /// A named entity mention
    NamedEntity,
    /// A governor -> dependent relation, spanning the dependent token
    DependencyArc,
    /// A group of entity mentions denoting the same referent
    CorefChain,
    /// Anything produced by a custom stage
    Custom(String),
}

impl AnnotationType {
    /// The canonical name used in serialized output
    pub fn as_str(&self) -> &str {
        match self {
            AnnotationType::Token => "Token",
            AnnotationType::SpaceToken => "SpaceToken",
            AnnotationType::Lookup => "Lookup",
            AnnotationType::Sentence => "Sentence",
            AnnotationType::Split => "Split",
            AnnotationType::NamedEntity => "NamedEntity",
            AnnotationType::DependencyArc => "DependencyArc",
            AnnotationType::CorefChain => "CorefChain",
            AnnotationType::Custom(name) => name,
        }
    }

    /// Layer covering annotations of this type
    pub fn layer(&self) -> Layer {
        Layer::of(self.clone())
    }

    /// Layer covering one feature of this type
    pub fn feature(&self, name: &str) -> Layer {
        Layer::feature(self.clone(), name)
    }
}

impl fmt::Display for AnnotationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnnotationType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Token" => AnnotationType::Token,
            "SpaceToken" => AnnotationType::SpaceToken,
            "Lookup" => AnnotationType::Lookup,
            "Sentence" => AnnotationType::Sentence,
            "Split" => AnnotationType::Split,
            "NamedEntity" => AnnotationType::NamedEntity,
            "DependencyArc" => AnnotationType::DependencyArc,
            "CorefChain" => AnnotationType::CorefChain,
            other => AnnotationType::Custom(other.to_string()),
        })
    }
}

impl From<String> for AnnotationType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(ty) => ty,
            Err(never) => match never {},
        }
    }
}

impl From<AnnotationType> for String {
    fn from(ty: AnnotationType) -> Self {
        ty.as_str().to_string()
    }
}

/// A unit of information a stage consumes or produces
///
/// Either a whole annotation type (`Token`) or one feature carried by an
/// annotation type (`Token.category`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Layer {
    /// Annotation type the layer lives on
    pub ty: AnnotationType,
    /// Feature name, `None` for the annotations themselves
    pub feature: Option<String>,
}

impl Layer {
    /// Layer for the annotations of a type
    pub fn of(ty: AnnotationType) -> Self {
        Self { ty, feature: None }
    }

    /// Layer for a feature of a type
    pub fn feature(ty: AnnotationType, name: &str) -> Self {
        Self {
            ty,
            feature: Some(name.to_string()),
        }
    }

    /// True for feature layers
    pub fn is_feature(&self) -> bool {
        self.feature.is_some()
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.feature {
            Some(name) => write!(f, "{}.{}", self.ty, name),
            None => write!(f, "{}", self.ty),
        }
    }
}
