//! Document serialization
//!
//! A formatter renders one annotated [`Document`] (text, document features
//! and every annotation set) to a writer. Offsets are character offsets
//! into the `Text` element, so span text can be recovered by slicing.

use anyhow::{Context, Result};
use gloss_core::{Annotation, Document};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub mod json;
pub mod xml;

pub use json::JsonFormatter;
pub use xml::XmlFormatter;

/// Trait for output formatters
pub trait DocumentFormatter: Send + Sync {
    /// File extension without the dot
    fn extension(&self) -> &'static str;

    /// Serialize `document` to `writer`
    fn write_document(&self, document: &Document, writer: &mut dyn Write) -> Result<()>;
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Stand-off annotation XML
    #[default]
    Xml,
    /// The same content as JSON
    Json,
}

impl OutputFormat {
    /// Formatter for this format
    pub fn formatter(self, pretty: bool) -> Box<dyn DocumentFormatter> {
        match self {
            OutputFormat::Xml => Box::new(XmlFormatter),
            OutputFormat::Json => Box::new(JsonFormatter::new(pretty)),
        }
    }
}

/// Annotations of one set ordered by start, then shorter span, then id
pub(crate) fn ordered(set: &gloss_core::AnnotationSet) -> Vec<&Annotation> {
    set.query(None, None)
}

/// `<stem>.<extension>`: the input's final extension is replaced
pub fn output_file_name(input: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string());
    PathBuf::from(format!("{stem}.{extension}"))
}

/// Serialize `document` into `output_dir`, named after `input`
///
/// Written to a hidden temporary file first and renamed into place, so a
/// failure never leaves a partial output file behind.
pub fn write_output(
    output_dir: &Path,
    input: &Path,
    document: &Document,
    formatter: &dyn DocumentFormatter,
) -> Result<PathBuf> {
    let name = output_file_name(input, formatter.extension());
    let target = output_dir.join(&name);
    let temp = output_dir.join(format!(".{}.tmp", name.display()));

    let result = write_to(&temp, document, formatter)
        .and_then(|()| fs::rename(&temp, &target).context("Failed to move output into place"));

    if let Err(e) = result {
        let _ = fs::remove_file(&temp);
        return Err(e.context(format!("Failed to write {}", target.display())));
    }
    Ok(target)
}

fn write_to(path: &Path, document: &Document, formatter: &dyn DocumentFormatter) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    formatter.write_document(document, &mut writer)?;
    writer.flush()?;
    Ok(())
}
