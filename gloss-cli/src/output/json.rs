//! JSON output formatter

use super::{ordered, DocumentFormatter};
use anyhow::Result;
use gloss_core::{Annotation, Document, FeatureMap, DEFAULT_SET};
use serde::Serialize;
use std::io::Write;

/// JSON formatter carrying the same content as the XML one
#[derive(Debug, Clone, Copy)]
pub struct JsonFormatter {
    pretty: bool,
}

/// Serialized document
#[derive(Debug, Serialize)]
pub struct DocumentData<'a> {
    /// Document id
    pub id: &'a str,
    /// Document-level features
    pub features: &'a FeatureMap,
    /// Verbatim text
    pub text: &'a str,
    /// Default set first, then named sets
    pub annotation_sets: Vec<SetData<'a>>,
}

/// Serialized annotation set
#[derive(Debug, Serialize)]
pub struct SetData<'a> {
    /// Set name, absent for the default set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    /// Annotations ordered by offset
    pub annotations: Vec<&'a Annotation>,
}

impl<'a> DocumentData<'a> {
    /// Borrow everything serializable from `document`
    pub fn new(document: &'a Document) -> Self {
        let annotation_sets = document
            .sets()
            .map(|set| SetData {
                name: (set.name() != DEFAULT_SET).then(|| set.name()),
                annotations: ordered(set),
            })
            .collect();

        Self {
            id: document.id(),
            features: document.features(),
            text: document.text(),
            annotation_sets,
        }
    }
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl DocumentFormatter for JsonFormatter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn write_document(&self, document: &Document, mut writer: &mut dyn Write) -> Result<()> {
        let data = DocumentData::new(document);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, &data)?;
        } else {
            serde_json::to_writer(&mut writer, &data)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gloss_core::{features, AnnotationType};
    use serde_json::Value;

    fn render(document: &Document, pretty: bool) -> Value {
        let mut buffer = Vec::new();
        JsonFormatter::new(pretty)
            .write_document(document, &mut buffer)
            .unwrap();
        serde_json::from_slice(&buffer).unwrap()
    }

    #[test]
    fn test_structure() {
        let mut doc = Document::new("a.txt", "Zoë runs.");
        doc.annotate(AnnotationType::Sentence, 0, 9, features! {}).unwrap();
        doc.annotate(AnnotationType::Token, 0, 3, features! { "kind" => "word" })
            .unwrap();

        let json = render(&doc, true);
        assert_eq!(json["id"], "a.txt");
        assert_eq!(json["text"], "Zoë runs.");

        let sets = json["annotation_sets"].as_array().unwrap();
        assert_eq!(sets.len(), 1);
        assert!(sets[0].get("name").is_none());

        // same start: the shorter token comes first
        let annotations = sets[0]["annotations"].as_array().unwrap();
        assert_eq!(annotations[0]["type"], "Token");
        assert_eq!(annotations[0]["span"]["end"], 3);
        assert_eq!(annotations[0]["features"]["kind"], "word");
        assert_eq!(annotations[1]["type"], "Sentence");
    }

    #[test]
    fn test_offsets_slice_text() {
        let mut doc = Document::new("b.txt", "naïve café");
        doc.annotate(AnnotationType::Token, 6, 10, features! {}).unwrap();

        let json = render(&doc, false);
        let text: Vec<char> = json["text"].as_str().unwrap().chars().collect();
        let span = &json["annotation_sets"][0]["annotations"][0]["span"];
        let start = span["start"].as_u64().unwrap() as usize;
        let end = span["end"].as_u64().unwrap() as usize;
        assert_eq!(text[start..end].iter().collect::<String>(), "café");
    }
}
