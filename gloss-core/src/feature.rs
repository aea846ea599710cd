//! Feature values attached to annotations and documents

use crate::annotation::AnnotationId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Feature map ordered by key so serialization is deterministic
pub type FeatureMap = BTreeMap<String, FeatureValue>;

/// A single feature value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    /// Boolean flag
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// References to other annotations in the same set
    Ids(Vec<AnnotationId>),
    /// Free text
    Str(String),
}

impl FeatureValue {
    /// Borrow the string payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FeatureValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload, if any
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FeatureValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Id list payload, if any
    pub fn as_ids(&self) -> Option<&[AnnotationId]> {
        match self {
            FeatureValue::Ids(ids) => Some(ids),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Bool(v) => write!(f, "{v}"),
            FeatureValue::Int(v) => write!(f, "{v}"),
            FeatureValue::Float(v) => write!(f, "{v}"),
            FeatureValue::Str(s) => f.write_str(s),
            FeatureValue::Ids(ids) => {
                f.write_str("[")?;
                for (i, id) in ids.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{id}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        FeatureValue::Str(s.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(s: String) -> Self {
        FeatureValue::Str(s)
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        FeatureValue::Int(v)
    }
}

impl From<usize> for FeatureValue {
    fn from(v: usize) -> Self {
        FeatureValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<bool> for FeatureValue {
    fn from(v: bool) -> Self {
        FeatureValue::Bool(v)
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Float(v)
    }
}

impl From<Vec<AnnotationId>> for FeatureValue {
    fn from(ids: Vec<AnnotationId>) -> Self {
        FeatureValue::Ids(ids)
    }
}

/// Build a [`FeatureMap`] from key/value pairs
///
/// ```
/// use gloss_core::{features, FeatureValue};
///
/// let map = features! { "kind" => "word", "length" => 4usize };
/// assert_eq!(map["kind"], FeatureValue::Str("word".into()));
/// ```
#[macro_export]
macro_rules! features {
    () => { $crate::FeatureMap::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::FeatureMap::new();
        $( map.insert(($key).to_string(), $crate::FeatureValue::from($value)); )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(FeatureValue::from("NNP").to_string(), "NNP");
        assert_eq!(FeatureValue::from(42i64).to_string(), "42");
        assert_eq!(FeatureValue::from(vec![1, 4, 9]).to_string(), "[1, 4, 9]");
        assert_eq!(FeatureValue::from(true).to_string(), "true");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(FeatureValue::from("x").as_str(), Some("x"));
        assert_eq!(FeatureValue::from(3usize).as_int(), Some(3));
        assert_eq!(FeatureValue::from(vec![2]).as_ids(), Some(&[2][..]));
        assert_eq!(FeatureValue::from(3usize).as_str(), None);
    }

    #[test]
    fn test_macro_orders_keys() {
        let map = features! { "b" => 1usize, "a" => "x" };
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }
}
