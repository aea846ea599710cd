//! Full pipeline runs over short documents

use gloss_core::{Annotation, AnnotationType, Document};
use gloss_engine::stages::feature;
use gloss_engine::{Pipeline, PipelineConfig};

const RUNNING_EXAMPLE: &str = "John Smith works at Acme Corp. He founded it in 1998.";

fn pipeline() -> Pipeline {
    Pipeline::standard(&PipelineConfig::default()).unwrap()
}

fn texts(doc: &Document, ty: AnnotationType) -> Vec<String> {
    doc.annotations()
        .of_type(&ty)
        .map(|a| doc.text_of(a).to_string())
        .collect()
}

fn snapshot(doc: &Document) -> Vec<Annotation> {
    doc.annotations().iter().cloned().collect()
}

#[test]
fn test_running_example() {
    let mut doc = Document::new("example.txt", RUNNING_EXAMPLE);
    pipeline().execute(&mut doc).unwrap();

    assert_eq!(
        texts(&doc, AnnotationType::Sentence),
        vec!["John Smith works at Acme Corp.", "He founded it in 1998."]
    );

    let tokens = texts(&doc, AnnotationType::Token);
    for word in ["John", "Smith", "works", "at", "Acme", "Corp", "He", "founded", "it", "in", "1998"] {
        assert!(tokens.iter().any(|t| t == word), "no token for '{word}'");
    }

    let entities = texts(&doc, AnnotationType::NamedEntity);
    assert!(entities.contains(&"John Smith".to_string()));
    assert!(entities.contains(&"Acme Corp.".to_string()));

    // the split sits on the full stop before "He"
    let he = RUNNING_EXAMPLE.find("He").unwrap();
    let split = doc
        .annotations()
        .of_type(&AnnotationType::Split)
        .filter(|s| s.end() <= he)
        .last()
        .unwrap();
    assert_eq!(doc.text_of(split), ".");
    assert_eq!(split.end(), he - 1);
}

#[test]
fn test_token_features() {
    let mut doc = Document::new("example.txt", RUNNING_EXAMPLE);
    pipeline().execute(&mut doc).unwrap();

    let works = doc
        .annotations()
        .of_type(&AnnotationType::Token)
        .find(|t| doc.text_of(t) == "works")
        .unwrap();
    assert_eq!(works.feature_str(feature::KIND), Some("word"));
    assert_eq!(works.feature_str(feature::ORTH), Some("lowercase"));
    assert_eq!(works.feature_str(feature::CATEGORY), Some("VBZ"));
    assert_eq!(works.feature_str(feature::ROOT), Some("work"));

    let year = doc
        .annotations()
        .of_type(&AnnotationType::Token)
        .find(|t| doc.text_of(t) == "1998")
        .unwrap();
    assert_eq!(year.feature_str(feature::KIND), Some("number"));
    assert_eq!(year.feature_str(feature::CATEGORY), Some("CD"));
}

#[test]
fn test_reprocessing_is_idempotent() {
    let pipeline = pipeline();
    let mut doc = Document::new("example.txt", RUNNING_EXAMPLE);

    pipeline.execute(&mut doc).unwrap();
    let first = snapshot(&doc);
    assert!(!first.is_empty());

    pipeline.execute(&mut doc).unwrap();
    assert_eq!(snapshot(&doc), first);
}

#[test]
fn test_separate_documents_do_not_share_state() {
    let pipeline = pipeline();

    let mut fresh = Document::new("b.txt", "Acme Corp. hired staff.");
    pipeline.execute(&mut fresh).unwrap();
    let alone = snapshot(&fresh);

    let mut other = Document::new("a.txt", "IBM hired staff. IBM grew.");
    pipeline.execute(&mut other).unwrap();
    let mut again = Document::new("b.txt", "Acme Corp. hired staff.");
    pipeline.execute(&mut again).unwrap();

    assert_eq!(snapshot(&again), alone);
}

#[test]
fn test_acronym_coreference() {
    let text = "IBM announced a deal. International Business Machines said IBM would hire.";
    let mut doc = Document::new("c.txt", text);
    pipeline().execute(&mut doc).unwrap();

    let chains: Vec<_> = doc
        .annotations()
        .of_type(&AnnotationType::CorefChain)
        .collect();
    assert_eq!(chains.len(), 1);

    let chain = chains[0];
    assert_eq!(doc.text_of(chain), "IBM");
    assert_eq!(chain.start(), 0);

    let members: Vec<String> = chain
        .feature(feature::MEMBERS)
        .and_then(|v| v.as_ids())
        .unwrap()
        .iter()
        .filter_map(|&id| doc.annotations().get(id))
        .map(|a| doc.text_of(a).to_string())
        .collect();
    assert_eq!(members, vec!["IBM", "International Business Machines", "IBM"]);
}

fn chain_texts(doc: &Document) -> Vec<Vec<String>> {
    doc.annotations()
        .of_type(&AnnotationType::CorefChain)
        .map(|chain| {
            chain
                .feature(feature::MEMBERS)
                .and_then(|v| v.as_ids())
                .unwrap_or_default()
                .iter()
                .filter_map(|&id| doc.annotations().get(id))
                .map(|a| doc.text_of(a).to_string())
                .collect()
        })
        .collect()
}

#[test]
fn test_unannotated_repeats_are_found() {
    let mut doc = Document::new("r.txt", "John Smith works at Acme Corp. Smith likes Acme.");
    pipeline().execute(&mut doc).unwrap();

    assert_eq!(
        texts(&doc, AnnotationType::NamedEntity),
        vec!["John Smith", "Acme Corp.", "Smith", "Acme"]
    );
    let smith = doc
        .annotations()
        .of_type(&AnnotationType::NamedEntity)
        .find(|e| doc.text_of(e) == "Smith")
        .unwrap();
    assert_eq!(smith.feature_str(feature::KIND), Some("Person"));
    assert_eq!(smith.feature_str(feature::RULE), Some("ortho-matcher"));

    assert_eq!(
        chain_texts(&doc),
        vec![vec!["John Smith", "Smith"], vec!["Acme Corp.", "Acme"]]
    );
}

#[test]
fn test_designator_variants_share_a_chain() {
    let mut doc = Document::new("v.txt", "Acme Corp. hired. Acme Corporation fired. Acme left.");
    pipeline().execute(&mut doc).unwrap();

    assert_eq!(
        chain_texts(&doc),
        vec![vec!["Acme Corp.", "Acme Corporation", "Acme"]]
    );
}

#[test]
fn test_unicode_offsets_are_characters() {
    let text = "Zoë Müller visited Paris. Café prices rose.";
    let mut doc = Document::new("u.txt", text);
    pipeline().execute(&mut doc).unwrap();

    for token in doc.annotations().of_type(&AnnotationType::Token) {
        let expected: String = text
            .chars()
            .skip(token.start())
            .take(token.end() - token.start())
            .collect();
        assert_eq!(doc.text_of(token), expected);
    }
    assert_eq!(texts(&doc, AnnotationType::Sentence).len(), 2);
}
