//! Assembly and execution of the standard pipeline

use gloss_core::{AnnotationType, Document};
use gloss_engine::stages::{feature, DependencyParser, Gazetteer, NeTransducer, Tokenizer};
use gloss_engine::*;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn write_models(dir: &Path) {
    let files = ModelFiles::default();
    fs::write(dir.join(&files.lemmatizer), "# form\tlemma\nfounded\tfound\n").unwrap();
    fs::write(dir.join(&files.tagger), "# form\ttag\n").unwrap();
    fs::write(dir.join(&files.parser), "# dependent\thead\tlabel\nCD\tIN\tPMOD\n").unwrap();
}

#[test]
fn test_parser_disabled_needs_no_models() {
    let config = PipelineConfig::builder()
        .enable_parser(false)
        .models_path(Some("/nonexistent/models".into()))
        .build()
        .unwrap();
    let pipeline = Pipeline::standard(&config).unwrap();

    assert!(!pipeline.stage_names().contains(&DependencyParser::NAME));
    assert!(!pipeline.produces(&AnnotationType::DependencyArc.layer()));

    let mut doc = Document::new("a.txt", "John Smith works at Acme Corp. He founded it in 1998.");
    pipeline.execute(&mut doc).unwrap();
    assert!(!doc.annotations().has_type(&AnnotationType::DependencyArc));
}

#[test]
fn test_parser_enabled_with_missing_models_fails_assembly() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::builder().parser(dir.path()).build().unwrap();
    let err = Pipeline::standard(&config).unwrap_err();
    assert!(matches!(err, PipelineError::ModelLoad { .. }));
}

#[test]
fn test_parser_enabled_with_binary_model_fails_assembly() {
    let dir = TempDir::new().unwrap();
    write_models(dir.path());
    fs::write(dir.path().join(ModelFiles::default().parser), [0u8, 159, 146, 150]).unwrap();

    let config = PipelineConfig::builder().parser(dir.path()).build().unwrap();
    let err = Pipeline::standard(&config).unwrap_err();
    assert!(err.to_string().contains("parser.model"));
}

#[test]
fn test_parser_enabled_produces_one_root_per_sentence() {
    let dir = TempDir::new().unwrap();
    write_models(dir.path());
    let config = PipelineConfig::builder().parser(dir.path()).build().unwrap();
    let pipeline = Pipeline::standard(&config).unwrap();
    assert_eq!(pipeline.stage_names().last(), Some(&DependencyParser::NAME));
    assert!(pipeline.produces(&AnnotationType::DependencyArc.layer()));

    let mut doc = Document::new("a.txt", "John Smith works at Acme Corp. He founded it in 1998.");
    pipeline.execute(&mut doc).unwrap();

    let set = doc.annotations();
    for sentence in set.of_type(&AnnotationType::Sentence) {
        let tokens = set.within(&AnnotationType::Token, sentence.span);
        let roots = tokens
            .iter()
            .filter(|t| t.feature(feature::HEAD).and_then(|v| v.as_int()) == Some(0))
            .count();
        assert_eq!(roots, 1, "sentence '{}'", doc.text_of(sentence));
    }

    let founded = set
        .of_type(&AnnotationType::Token)
        .find(|t| doc.text_of(t) == "founded")
        .unwrap();
    assert_eq!(founded.feature_str(feature::LEMMA), Some("found"));
    assert!(set.has_type(&AnnotationType::DependencyArc));
}

#[test]
fn test_custom_order_rejected_at_assembly() {
    // gazetteer before the tokenizer
    let rules = LanguageRules::english().unwrap();
    let err = Pipeline::builder()
        .stage(Gazetteer::new(rules.gazetteer_lists()))
        .stage(Tokenizer::new())
        .build()
        .unwrap_err();
    assert_eq!(err.missing_layers(), &[AnnotationType::Token.layer()]);
}

#[test]
fn test_transducer_without_upstream_reports_every_missing_layer() {
    let err = Pipeline::builder()
        .stage(Tokenizer::new())
        .stage(NeTransducer::new().unwrap())
        .build()
        .unwrap_err();

    match err {
        PipelineError::Assembly { stage, missing } => {
            assert_eq!(stage, NeTransducer::NAME);
            assert!(missing.contains(&AnnotationType::Lookup.layer()));
            assert!(missing.contains(&AnnotationType::Sentence.layer()));
            assert!(missing.contains(&AnnotationType::Token.feature(feature::CATEGORY)));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_empty_document_skips_dependent_stages() {
    let pipeline = Pipeline::standard(&PipelineConfig::default()).unwrap();
    let mut doc = Document::new("empty.txt", "");
    let report = pipeline.execute(&mut doc).unwrap();

    assert_eq!(report.produced(), 0);
    assert!(report.skipped().contains(&"gazetteer"));
    assert!(report.skipped().contains(&"ortho-matcher"));
    assert!(!report.skipped().contains(&"tokenizer"));
}

#[test]
fn test_invariant_check_passes_on_standard_output() {
    let config = PipelineConfig::builder()
        .check_invariants(true)
        .stage_timeout(Some(Duration::from_secs(30)))
        .build()
        .unwrap();
    let pipeline = Pipeline::standard(&config).unwrap();

    let mut doc = Document::new(
        "b.txt",
        "Dr. Watson flew to New York on Monday. IBM said sales rose 5 percent.",
    );
    let report = pipeline.execute(&mut doc).unwrap();
    assert_eq!(report.stages.len(), pipeline.len());
    assert!(doc.find_overlap().is_none());
}

#[test]
fn test_invariant_check_passes_with_parser() {
    let dir = TempDir::new().unwrap();
    write_models(dir.path());
    let config = PipelineConfig::builder()
        .parser(dir.path())
        .check_invariants(true)
        .build()
        .unwrap();
    let pipeline = Pipeline::standard(&config).unwrap();

    let mut doc = Document::new(
        "a.txt",
        "John Smith works at Acme Corp. Smith founded it in New York in 1998.",
    );
    pipeline.execute(&mut doc).unwrap();
    assert!(doc.find_overlap().is_none());

    let set = doc.annotations();
    let arcs: Vec<_> = set.of_type(&AnnotationType::DependencyArc).collect();
    let tokens = set.of_type(&AnnotationType::Token).count();
    let sentences = set.of_type(&AnnotationType::Sentence).count();
    assert_eq!(arcs.len(), tokens - sentences);

    for arc in arcs {
        let dependent = arc.feature(gloss_core::arc::DEPENDENT).and_then(|v| v.as_ids()).unwrap()[0];
        assert_eq!(set.get(dependent).unwrap().span, arc.span);
    }
}

#[test]
fn test_extra_gazetteer_lists() {
    let dir = TempDir::new().unwrap();
    let lists = dir.path().join("extra.toml");
    fs::write(
        &lists,
        "[[gazetteer]]\nmajor = \"organization\"\nminor = \"company\"\nentries = [\"Globex\"]\n",
    )
    .unwrap();

    let config = PipelineConfig::builder()
        .gazetteer_lists(Some(lists))
        .build()
        .unwrap();
    let pipeline = Pipeline::standard(&config).unwrap();

    let mut doc = Document::new("c.txt", "Globex hired staff.");
    pipeline.execute(&mut doc).unwrap();
    let entity = doc
        .annotations()
        .of_type(&AnnotationType::NamedEntity)
        .next()
        .unwrap();
    assert_eq!(doc.text_of(entity), "Globex");
    assert_eq!(entity.feature_str(feature::KIND), Some("Organization"));
}

#[test]
fn test_bad_gazetteer_file_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let lists = dir.path().join("broken.toml");
    fs::write(&lists, "[[gazetteer]]\nmajor = 3\n").unwrap();

    let config = PipelineConfig::builder()
        .gazetteer_lists(Some(lists))
        .build()
        .unwrap();
    assert!(matches!(
        Pipeline::standard(&config),
        Err(PipelineError::Configuration(_))
    ));
}
