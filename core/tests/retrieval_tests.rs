use std::collections::{BTreeMap, BTreeSet};

use fable_core::document::filter_collection;
use fable_core::index::{InvertedIndex, VectorIndex};
use fable_core::model::vector::ScoredDocument;
use fable_core::model::{SignatureBooleanModel, VectorSpaceModel};
use fable_core::persist::snapshot_bytes;
use fable_core::{
    DocId, Document, Engine, EngineConfig, Model, ModelKind, RetrievalModel, StopWords, TermViewOptions,
};
use proptest::prelude::*;

fn fox_collection() -> (Vec<Document>, StopWords) {
    let collection = vec![
        Document::from_terms(0, "doc0", ["the", "fox", "runs"]),
        Document::from_terms(1, "doc1", ["the", "dog", "runs"]),
        Document::from_terms(2, "doc2", ["a", "fox", "hides"]),
    ];
    let stop_words: StopWords = ["the", "a"].into_iter().map(String::from).collect();
    (collection, stop_words)
}

fn ids(set: &[u32]) -> BTreeSet<DocId> {
    set.iter().copied().collect()
}

#[test]
fn fox_scenario_inverted_index() {
    let (mut collection, stop_words) = fox_collection();
    filter_collection(&mut collection, &stop_words);
    let index = InvertedIndex::build(&collection, TermViewOptions::new(true, false)).unwrap();

    let expected: BTreeMap<String, BTreeSet<DocId>> = [
        ("fox", ids(&[0, 2])),
        ("runs", ids(&[0, 1])),
        ("dog", ids(&[1])),
        ("hides", ids(&[2])),
    ]
    .into_iter()
    .map(|(t, s)| (t.to_string(), s))
    .collect();
    assert_eq!(index.postings, expected);
    assert_eq!(index.union(&["fox", "runs"]), ids(&[0, 1, 2]));
}

#[test]
fn fox_scenario_through_engine() {
    let (collection, stop_words) = fox_collection();
    let mut engine = Engine::new(collection, stop_words, EngineConfig::default());
    engine.prepare(true, false);
    engine.set_model(ModelKind::InvertedList);

    let hits = engine.search("fox runs", TermViewOptions::new(true, false)).unwrap();
    let found: Vec<(f64, DocId)> = hits.iter().map(|h| (h.score, h.document.id)).collect();
    assert_eq!(found, vec![(1.0, 0), (1.0, 1), (1.0, 2)]);
}

#[test]
fn every_model_answers_the_fox_query() {
    let (collection, stop_words) = fox_collection();
    let mut engine = Engine::new(collection, stop_words, EngineConfig::default());
    engine.prepare(true, true);
    for kind in [ModelKind::Linear, ModelKind::InvertedList, ModelKind::Signature] {
        engine.set_model(kind);
        let hits = engine.search("dog", TermViewOptions::new(true, false)).unwrap();
        let found: Vec<DocId> = hits.iter().map(|h| h.document.id).collect();
        assert!(found.contains(&1), "{kind} missed doc 1");
    }
}

#[test]
fn term_in_every_document_contributes_nothing() {
    let collection = vec![
        Document::from_terms(0, "a", ["fox", "tale"]),
        Document::from_terms(1, "b", ["dog", "tale", "tale"]),
        Document::from_terms(2, "c", ["owl", "tale"]),
    ];
    let mut model = VectorSpaceModel::new();
    model.build_inverted_index(&collection, TermViewOptions::default()).unwrap();
    let index = model.index().unwrap();
    assert_eq!(index.idf("tale"), Some(0.0));
    assert!(index.get("tale").unwrap().iter().all(|p| p.weight == 0.0));

    let positive = |query: &str| -> Vec<ScoredDocument> {
        model.search(query, 3).unwrap().into_iter().filter(|hit| hit.score > 0.0).collect()
    };
    let with = positive("tale fox dog");
    let without = positive("zzz fox dog");
    assert_eq!(without.len(), 2);
    assert_eq!(with.len(), without.len());
    for (a, b) in with.iter().zip(&without) {
        assert_eq!(a.doc_id, b.doc_id);
        assert!((a.score - b.score).abs() < 1e-12);
    }
}

#[test]
fn builds_are_deterministic() {
    let (mut collection, stop_words) = fox_collection();
    filter_collection(&mut collection, &stop_words);
    let options = TermViewOptions::new(true, false);
    for kind in [ModelKind::InvertedList, ModelKind::Signature, ModelKind::VectorSpace] {
        let build = || {
            let mut engine = Engine::new(collection.clone(), stop_words.clone(), EngineConfig::default());
            engine.set_model(kind);
            engine.ensure_index(options).unwrap();
            snapshot_bytes(engine.model().unwrap()).unwrap()
        };
        let first = build();
        assert!(!first.is_empty());
        assert_eq!(first, build(), "{kind} differs between builds");
    }
}

#[test]
fn vector_lengths_are_not_used_for_scoring() {
    let collection = vec![
        Document::from_terms(0, "short", ["fox"]),
        Document::from_terms(1, "long", ["fox", "dog", "owl", "cat", "hen"]),
        Document::from_terms(2, "other", ["ant"]),
    ];
    let index = VectorIndex::build(&collection, TermViewOptions::default()).unwrap();
    assert!(index.document_length(1).unwrap() > index.document_length(0).unwrap());

    let model = VectorSpaceModel::with_index(index);
    let hits = model.search("fox ant", 3).unwrap();
    let fox_scores: Vec<f64> = hits.iter().filter(|h| h.doc_id != 2).map(|h| h.score).collect();
    assert_eq!(fox_scores.len(), 2);
    assert!((fox_scores[0] - fox_scores[1]).abs() < 1e-12);
}

fn arb_terms() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-f]{1,3}", 0..12)
}

fn arb_collection() -> impl Strategy<Value = Vec<Document>> {
    proptest::collection::vec(arb_terms(), 1..8).prop_map(|docs| {
        docs.into_iter()
            .enumerate()
            .map(|(i, terms)| Document::from_terms(i as DocId, format!("doc{i}"), terms))
            .collect()
    })
}

fn arb_terms_and_subset() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
    proptest::collection::vec("[a-z]{1,8}", 1..16).prop_flat_map(|terms| {
        let n = terms.len();
        (Just(terms.clone()), proptest::sample::subsequence(terms, 0..=n))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn filtered_terms_are_indexed(
        mut collection in arb_collection(),
        stop_words in proptest::collection::hash_set("[a-f]{1,2}", 0..6),
    ) {
        filter_collection(&mut collection, &stop_words);
        let options = TermViewOptions::new(true, false);
        let index = InvertedIndex::build(&collection, options).unwrap();
        for document in &collection {
            for term in document.filtered_terms.as_ref().unwrap() {
                prop_assert!(!stop_words.contains(term));
                prop_assert!(index.get(term).unwrap().contains(&document.id));
            }
        }
    }

    #[test]
    fn signatures_have_no_false_negatives((terms, query) in arb_terms_and_subset()) {
        let document = Document::from_terms(0, "d", terms);
        let mut model = SignatureBooleanModel::new();
        let repr = model.document_to_representation(&document, TermViewOptions::default()).unwrap();
        let query = query.join(" ");
        prop_assert_eq!(model.match_score(&repr, &model.query_to_representation(&query)), 1.0);

        model.build_signature_index(std::slice::from_ref(&document), TermViewOptions::default()).unwrap();
        prop_assert_eq!(model.search(&query).unwrap(), vec![0]);
    }

    #[test]
    fn ranking_respects_k(
        collection in arb_collection(),
        query in proptest::collection::vec("[a-f]{1,3}", 1..6),
        k in 0usize..6,
    ) {
        let mut model = VectorSpaceModel::new();
        model.build_inverted_index(&collection, TermViewOptions::default()).unwrap();
        let query = model.query_to_vector(&query.join(" "));

        let hits = model.rank(&query, k).unwrap();
        prop_assert!(hits.len() <= k);
        prop_assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
        let unique: BTreeSet<DocId> = hits.iter().map(|h| h.doc_id).collect();
        prop_assert_eq!(unique.len(), hits.len());

        // With room for every document nothing is pruned: scores are exact and
        // every document left out shares no term with the query.
        let all = model.rank(&query, collection.len()).unwrap();
        for document in &collection {
            let repr = model.document_to_representation(document, TermViewOptions::default()).unwrap();
            let exact = model.match_score(&repr, &query);
            match all.iter().find(|h| h.doc_id == document.id) {
                Some(hit) => prop_assert!((hit.score - exact).abs() < 1e-9),
                None => prop_assert_eq!(exact, 0.0),
            }
        }
    }
}

#[test]
fn snapshot_model_reports_its_kind() {
    let model = Model::new(ModelKind::VectorSpace);
    assert_eq!(model.kind(), ModelKind::VectorSpace);
    assert_eq!(model.to_string(), "Vector Space Model");
}
