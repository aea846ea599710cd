//! XML output formatter
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Document Id="a.txt">
//! <DocumentFeatures>
//! <Feature><Name>encoding</Name><Value>UTF-8</Value></Feature>
//! </DocumentFeatures>
//! <Text>John Smith works at Acme Corp.</Text>
//! <AnnotationSet>
//! <Annotation Id="0" Type="Token" StartNode="0" EndNode="4">
//! <Feature><Name>kind</Name><Value>word</Value></Feature>
//! </Annotation>
//! </AnnotationSet>
//! </Document>
//! ```

use super::{ordered, DocumentFormatter};
use anyhow::Result;
use gloss_core::{Document, FeatureMap, FeatureValue, DEFAULT_SET};
use std::io::Write;

/// Stand-off annotation XML
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFormatter;

impl DocumentFormatter for XmlFormatter {
    fn extension(&self) -> &'static str {
        "xml"
    }

    fn write_document(&self, document: &Document, w: &mut dyn Write) -> Result<()> {
        writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(w, r#"<Document Id="{}">"#, escape(document.id(), true))?;

        writeln!(w, "<DocumentFeatures>")?;
        write_features(w, document.features())?;
        writeln!(w, "</DocumentFeatures>")?;

        writeln!(w, "<Text>{}</Text>", escape(document.text(), false))?;

        for set in document.sets() {
            if set.name() == DEFAULT_SET {
                writeln!(w, "<AnnotationSet>")?;
            } else {
                writeln!(w, r#"<AnnotationSet Name="{}">"#, escape(set.name(), true))?;
            }

            for annotation in ordered(set) {
                writeln!(
                    w,
                    r#"<Annotation Id="{}" Type="{}" StartNode="{}" EndNode="{}">"#,
                    annotation.id,
                    escape(annotation.ty.as_str(), true),
                    annotation.start(),
                    annotation.end()
                )?;
                write_features(w, &annotation.features)?;
                writeln!(w, "</Annotation>")?;
            }

            writeln!(w, "</AnnotationSet>")?;
        }

        writeln!(w, "</Document>")?;
        Ok(())
    }
}

fn write_features(w: &mut dyn Write, features: &FeatureMap) -> Result<()> {
    for (name, value) in features {
        writeln!(
            w,
            "<Feature><Name>{}</Name>{}</Feature>",
            escape(name, false),
            value_element(value)
        )?;
    }
    Ok(())
}

fn value_element(value: &FeatureValue) -> String {
    let (kind, text) = match value {
        FeatureValue::Str(s) => return format!("<Value>{}</Value>", escape(s, false)),
        FeatureValue::Ids(ids) => (
            "ids",
            ids.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
        ),
        FeatureValue::Bool(_) => ("bool", value.to_string()),
        FeatureValue::Int(_) => ("int", value.to_string()),
        FeatureValue::Float(_) => ("float", value.to_string()),
    };
    format!(r#"<Value Type="{kind}">{text}</Value>"#)
}

/// Escape markup characters
///
/// Characters XML 1.0 cannot carry become U+FFFD one for one, which keeps
/// character offsets into `<Text>` valid.
fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\'' if attribute => out.push_str("&apos;"),
            '\r' => out.push_str("&#13;"),
            '\t' | '\n' => out.push(c),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => out.push('\u{FFFD}'),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gloss_core::{features, AnnotationType};

    fn render(document: &Document) -> String {
        let mut buffer = Vec::new();
        XmlFormatter.write_document(document, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b & \"c\"", false), "a &lt; b &amp; \"c\"");
        assert_eq!(escape("\"x\"", true), "&quot;x&quot;");
        assert_eq!(escape("a\u{1}b", false), "a\u{FFFD}b");
        assert_eq!(escape("line\r\n", false), "line&#13;\n");
    }

    #[test]
    fn test_document_layout() {
        let mut doc = Document::new("a.txt", "Hi <you>.");
        doc.set_feature("encoding", "UTF-8");
        doc.annotate(
            AnnotationType::Token,
            0,
            2,
            features! { "kind" => "word", "length" => 2usize },
        )
        .unwrap();
        doc.set_mut("Original markups")
            .add(AnnotationType::Custom("paragraph".into()), 0, 9, features! {})
            .unwrap();

        let xml = render(&doc);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Document Id=\"a.txt\">"));
        assert!(xml.contains("<Feature><Name>encoding</Name><Value>UTF-8</Value></Feature>"));
        assert!(xml.contains("<Text>Hi &lt;you&gt;.</Text>"));
        assert!(xml.contains(r#"<Annotation Id="0" Type="Token" StartNode="0" EndNode="2">"#));
        assert!(xml.contains(r#"<Feature><Name>length</Name><Value Type="int">2</Value></Feature>"#));
        assert!(xml.contains(r#"<AnnotationSet Name="Original markups">"#));
        assert!(xml.trim_end().ends_with("</Document>"));

        // default set first, features in name order
        let unnamed = xml.find("<AnnotationSet>").unwrap();
        let named = xml.find("<AnnotationSet Name=").unwrap();
        assert!(unnamed < named);
        assert!(xml.find("<Name>kind</Name>").unwrap() < xml.find("<Name>length</Name>").unwrap());
    }

    #[test]
    fn test_id_lists() {
        let mut doc = Document::new("b.txt", "IBM and IBM");
        doc.annotate(
            AnnotationType::CorefChain,
            0,
            3,
            features! { "members" => vec![0usize, 1] },
        )
        .unwrap();
        assert!(render(&doc).contains(r#"<Value Type="ids">0 1</Value>"#));
    }
}
