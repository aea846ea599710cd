//! Property tests for the span and annotation model

use gloss_core::{features, AnnotationError, AnnotationType, Document, Span};
use proptest::prelude::*;

fn text_and_span() -> impl Strategy<Value = (String, usize, usize)> {
    "[a-zé ]{0,40}".prop_flat_map(|text| {
        let len = text.chars().count();
        (Just(text), 0..=len).prop_flat_map(move |(text, start)| {
            (Just(text), Just(start), start..=len)
        })
    })
}

fn pick_type(n: usize) -> AnnotationType {
    match n {
        0 => AnnotationType::Token,
        1 => AnnotationType::Lookup,
        _ => AnnotationType::DependencyArc,
    }
}

proptest! {
    #[test]
    fn created_annotation_round_trips((text, start, end) in text_and_span()) {
        let mut doc = Document::new("p", text.clone());
        let id = doc
            .annotate(AnnotationType::Lookup, start, end, features! {})
            .unwrap();

        let found = doc.annotations().query(Some(&AnnotationType::Lookup), None);
        prop_assert_eq!(found.len(), 1);
        prop_assert_eq!(found[0].id, id);
        prop_assert_eq!(found[0].span, Span::new(start, end));

        let expected: String = text.chars().skip(start).take(end - start).collect();
        prop_assert_eq!(doc.text_of(found[0]), expected.as_str());
    }

    #[test]
    fn reversed_or_out_of_bounds_spans_fail(text in "[a-z]{0,20}", a in 0usize..30, b in 0usize..30) {
        let mut doc = Document::new("p", text.clone());
        let len = text.chars().count();
        let result = doc.annotate(AnnotationType::Token, a, b, features! {});
        if a > b || b > len {
            let is_invalid_span = matches!(result, Err(AnnotationError::InvalidSpan { .. }));
            prop_assert!(is_invalid_span);
        } else {
            prop_assert!(result.is_ok());
        }
    }

    #[test]
    fn same_type_never_overlaps(spans in proptest::collection::vec((0usize..50, 0usize..8, 0usize..3), 0..40)) {
        let mut doc = Document::new("p", "x".repeat(60));
        for (start, width, ty) in spans {
            // rejected overlaps are expected; the set must stay consistent either way
            let _ = doc.annotate(pick_type(ty), start, start + width, features! {});
        }

        for ty in (0..3).map(pick_type) {
            let found = doc.annotations().query(Some(&ty), None);
            for (i, a) in found.iter().enumerate() {
                for b in found.iter().skip(i + 1) {
                    prop_assert!(!a.span.overlaps(&b.span), "{} {} overlaps {}", ty, a.span, b.span);
                }
            }
        }
        prop_assert!(doc.find_overlap().is_none());
    }

    #[test]
    fn query_is_sorted(spans in proptest::collection::vec((0usize..50, 0usize..8, 0usize..3), 0..40)) {
        let mut doc = Document::new("p", "x".repeat(60));
        for (start, width, ty) in spans {
            let _ = doc.annotate(pick_type(ty), start, start + width, features! {});
        }
        let all = doc.annotations().query(None, None);
        for pair in all.windows(2) {
            let a = (pair[0].span.start, pair[0].span.len(), pair[0].id);
            let b = (pair[1].span.start, pair[1].span.len(), pair[1].id);
            prop_assert!(a < b);
        }
    }
}

#[test]
fn removal_does_not_disturb_ordering() {
    let mut doc = Document::new("p", "one two three four");
    let ids: Vec<_> = [(0, 3), (4, 7), (8, 13), (14, 18)]
        .iter()
        .map(|&(s, e)| doc.annotate(AnnotationType::Token, s, e, features! {}).unwrap())
        .collect();

    doc.annotations_mut().remove(ids[1]).unwrap();

    let words: Vec<_> = doc
        .annotations()
        .of_type(&AnnotationType::Token)
        .map(|a| doc.text_of(a).to_string())
        .collect();
    assert_eq!(words, vec!["one", "three", "four"]);
}
