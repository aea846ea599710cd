//! Model artifacts for the dependency parser
//!
//! Each artifact is a UTF-8 text table with tab-separated columns. Blank
//! lines and lines starting with `#` are ignored.
//!
//! | Artifact   | Columns                                   |
//! |------------|-------------------------------------------|
//! | lemmatizer | `form  lemma`                             |
//! | tagger     | `form  tag`                               |
//! | parser     | `dependent-tag-prefix  head-tag-prefix  label` |

use crate::config::ModelFiles;
use crate::error::{PipelineError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Label override for arcs whose tags match the given prefixes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRule {
    /// Prefix of the dependent's tag
    pub dependent: String,
    /// Prefix of the head's tag
    pub head: String,
    /// Label to use
    pub label: String,
}

/// The three loaded artifacts
#[derive(Debug, Clone, Default)]
pub struct ModelSet {
    lemmas: HashMap<String, String>,
    tags: HashMap<String, String>,
    labels: Vec<LabelRule>,
}

impl ModelSet {
    /// Load all three artifacts from `base`
    pub fn load(base: &Path, files: &ModelFiles) -> Result<Self> {
        let [lemmatizer, tagger, parser] = files.resolve(base);

        let lemmas = read_table(&lemmatizer, 2)?
            .into_iter()
            .map(|row| (row[0].to_lowercase(), row[1].clone()))
            .collect();
        let tags = read_table(&tagger, 2)?
            .into_iter()
            .map(|row| (row[0].clone(), row[1].clone()))
            .collect();
        let labels = read_table(&parser, 3)?
            .into_iter()
            .map(|row| LabelRule {
                dependent: row[0].clone(),
                head: row[1].clone(),
                label: row[2].clone(),
            })
            .collect();

        let models = Self {
            lemmas,
            tags,
            labels,
        };
        log::info!(
            "loaded parser models from {}: {} lemmas, {} tag entries, {} label rules",
            base.display(),
            models.lemmas.len(),
            models.tags.len(),
            models.labels.len()
        );
        Ok(models)
    }

    /// Build from in-memory tables
    pub fn from_parts(
        lemmas: HashMap<String, String>,
        tags: HashMap<String, String>,
        labels: Vec<LabelRule>,
    ) -> Self {
        Self {
            lemmas,
            tags,
            labels,
        }
    }

    /// Lemma for a word form, case-insensitive
    pub fn lemma(&self, form: &str) -> Option<&str> {
        self.lemmas.get(&form.to_lowercase()).map(String::as_str)
    }

    /// Tag forced for an exact word form
    pub fn tag(&self, form: &str) -> Option<&str> {
        self.tags.get(form).map(String::as_str)
    }

    /// First label rule matching the dependent and head tags
    pub fn label(&self, dependent_tag: &str, head_tag: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|rule| dependent_tag.starts_with(&rule.dependent) && head_tag.starts_with(&rule.head))
            .map(|rule| rule.label.as_str())
    }
}

fn model_error(path: &Path, reason: impl Into<String>) -> PipelineError {
    PipelineError::ModelLoad {
        path: PathBuf::from(path),
        reason: reason.into(),
    }
}

/// Rows of a tab-separated table with exactly `columns` fields each
fn read_table(path: &Path, columns: usize) -> Result<Vec<Vec<String>>> {
    let bytes = fs::read(path).map_err(|e| model_error(path, e.to_string()))?;
    if bytes.contains(&0) {
        return Err(model_error(path, "binary data in text model"));
    }
    let content =
        String::from_utf8(bytes).map_err(|_| model_error(path, "model is not valid UTF-8"))?;

    let mut rows = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let row: Vec<String> = line.split('\t').map(|f| f.trim().to_string()).collect();
        if row.len() != columns || row.iter().any(String::is_empty) {
            return Err(model_error(
                path,
                format!("line {}: expected {columns} tab-separated fields", number + 1),
            ));
        }
        rows.push(row);
    }
    Ok(rows)
}
