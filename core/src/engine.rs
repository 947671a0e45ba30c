use std::cmp::Ordering;
use std::time::Instant;

use crate::document::{filter_collection, stem_collection, DocId, Document};
use crate::error::{Result, RetrievalError};
use crate::model::{
    InvertedListBooleanModel, LinearBooleanModel, Model, ModelKind, SignatureBooleanModel, TermViewOptions,
    VectorSpaceModel,
};
use crate::persist::MetaFile;
use crate::porter::stem_query;
use crate::tokenizer::StopWords;

/// Number of results returned by ranked searches unless configured otherwise.
pub const DEFAULT_OUTPUT_K: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub output_k: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { output_k: DEFAULT_OUTPUT_K }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit<'a> {
    pub score: f64,
    pub document: &'a Document,
}

/// Owns a collection, its stop words and the selected retrieval model.
#[derive(Debug, Default)]
pub struct Engine {
    collection: Vec<Document>,
    stop_words: StopWords,
    model: Option<Model>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(collection: Vec<Document>, stop_words: StopWords, config: EngineConfig) -> Self {
        Self { collection, stop_words, model: None, config }
    }

    pub fn collection(&self) -> &[Document] {
        &self.collection
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Replaces the collection. Existing snapshots are discarded.
    pub fn set_collection(&mut self, collection: Vec<Document>) {
        self.collection = collection;
        self.invalidate();
    }

    /// Replaces the stop words. Documents that already carry a filtered view
    /// are filtered again and existing snapshots are discarded.
    pub fn set_stop_words(&mut self, stop_words: StopWords) {
        self.stop_words = stop_words;
        for document in self.collection.iter_mut().filter(|d| d.filtered_terms.is_some()) {
            document.apply_stop_words(&self.stop_words);
        }
        self.invalidate();
    }

    /// Runs the optional pipeline stages over the whole collection.
    pub fn prepare(&mut self, stopword_filtering: bool, stemming: bool) {
        if stopword_filtering {
            filter_collection(&mut self.collection, &self.stop_words);
        }
        if stemming {
            stem_collection(&mut self.collection);
        }
        self.invalidate();
    }

    /// Selects a model; its index is built on the first search.
    pub fn set_model(&mut self, kind: ModelKind) {
        tracing::info!(model = %kind, "selected retrieval model");
        self.model = Some(Model::new(kind));
    }

    /// Installs a model carrying a previously built snapshot.
    pub fn install_model(&mut self, model: Model) {
        tracing::info!(model = %model, "installed retrieval model");
        self.model = Some(model);
    }

    /// Installs a loaded snapshot if it was built over a collection of the
    /// current size. Otherwise a fresh model of the same kind is selected and
    /// `false` is returned.
    pub fn install_snapshot(&mut self, model: Model, meta: &MetaFile) -> bool {
        let num_docs = self.collection.len();
        if meta.num_docs as usize != num_docs || meta.model != model.kind() {
            tracing::warn!(snapshot_docs = meta.num_docs, num_docs, model = %model, "snapshot does not match the collection, rebuilding");
            self.set_model(model.kind());
            return false;
        }
        self.install_model(model);
        true
    }

    fn invalidate(&mut self) {
        if let Some(model) = self.model.as_mut() {
            *model = Model::new(model.kind());
        }
    }

    pub fn document(&self, id: DocId) -> Result<&Document> {
        self.collection.iter().find(|d| d.id == id).ok_or(RetrievalError::UnknownDocument(id))
    }

    /// Builds the selected model's index unless a snapshot with the same
    /// options already exists.
    pub fn ensure_index(&mut self, options: TermViewOptions) -> Result<()> {
        let collection = &self.collection;
        match self.model.as_mut() {
            None => return Err(RetrievalError::NoModel),
            Some(Model::Linear) => {}
            Some(Model::InvertedList(model)) => {
                if model.built_with() != Some(options) {
                    model.build_inverted_index(collection, options)?;
                }
            }
            Some(Model::Signature(model)) => {
                if model.built_with() != Some(options) {
                    model.build_signature_index(collection, options)?;
                }
            }
            Some(Model::VectorSpace(model)) => {
                if model.built_with() != Some(options) {
                    model.build_inverted_index(collection, options)?;
                }
            }
        }
        Ok(())
    }

    /// Runs `query` against the selected model and keeps hits scoring above zero.
    ///
    /// With `stemming` set the query is stemmed first. Indices are built (or
    /// rebuilt) for `options` when needed.
    pub fn search(&mut self, query: &str, options: TermViewOptions) -> Result<Vec<SearchHit<'_>>> {
        let kind = self.model.as_ref().ok_or(RetrievalError::NoModel)?.kind();
        let query = if options.stemming { stem_query(query) } else { query.to_string() };

        let start = Instant::now();
        self.ensure_index(options)?;
        let hits = match kind {
            ModelKind::Linear => self.basic_query_search(&query, options)?,
            ModelKind::InvertedList => self.inverted_list_search(&query)?,
            ModelKind::Signature => self.signature_search(&query)?,
            ModelKind::VectorSpace => self.vsm_search(&query)?,
        };
        let hits: Vec<SearchHit<'_>> = hits.into_iter().filter(|hit| hit.score > 0.0).collect();

        let elapsed = start.elapsed();
        tracing::info!(model = %kind, query = %query, hits = hits.len(), took_ms = elapsed.as_secs_f64() * 1000.0, "search complete");
        Ok(hits)
    }

    /// Linear scan: every document ranked by its boolean score, truncated to `output_k`.
    pub fn basic_query_search(&self, query: &str, options: TermViewOptions) -> Result<Vec<SearchHit<'_>>> {
        let mut ranked = LinearBooleanModel::new(&self.collection).scores(query, options)?;
        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        Ok(ranked
            .into_iter()
            .take(self.config.output_k)
            .map(|(score, document)| SearchHit { score, document })
            .collect())
    }

    /// All documents in the union of the query terms' posting sets, in collection order.
    pub fn inverted_list_search(&self, query: &str) -> Result<Vec<SearchHit<'_>>> {
        let model = self.inverted_model()?;
        let ids = model.search(query)?;
        Ok(self
            .collection
            .iter()
            .filter(|d| ids.contains(&d.id))
            .map(|document| SearchHit { score: 1.0, document })
            .collect())
    }

    pub fn signature_search(&self, query: &str) -> Result<Vec<SearchHit<'_>>> {
        let model = self.signature_model()?;
        model
            .search(query)?
            .into_iter()
            .map(|id| self.document(id).map(|document| SearchHit { score: 1.0, document }))
            .collect()
    }

    /// Top `output_k` documents of the vector space model.
    pub fn vsm_search(&self, query: &str) -> Result<Vec<SearchHit<'_>>> {
        let model = self.vector_model()?;
        model
            .search(query, self.config.output_k)?
            .into_iter()
            .map(|scored| self.document(scored.doc_id).map(|document| SearchHit { score: scored.score, document }))
            .collect()
    }

    fn inverted_model(&self) -> Result<&InvertedListBooleanModel> {
        match self.model.as_ref() {
            Some(Model::InvertedList(model)) => Ok(model),
            Some(other) => {
                Err(RetrievalError::ModelTypeMismatch { expected: ModelKind::InvertedList, found: other.kind() })
            }
            None => Err(RetrievalError::NoModel),
        }
    }

    fn signature_model(&self) -> Result<&SignatureBooleanModel> {
        match self.model.as_ref() {
            Some(Model::Signature(model)) => Ok(model),
            Some(other) => Err(RetrievalError::ModelTypeMismatch { expected: ModelKind::Signature, found: other.kind() }),
            None => Err(RetrievalError::NoModel),
        }
    }

    fn vector_model(&self) -> Result<&VectorSpaceModel> {
        match self.model.as_ref() {
            Some(Model::VectorSpace(model)) => Ok(model),
            Some(other) => {
                Err(RetrievalError::ModelTypeMismatch { expected: ModelKind::VectorSpace, found: other.kind() })
            }
            None => Err(RetrievalError::NoModel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        let collection = vec![
            Document::from_terms(0, "Fox runs", ["the", "fox", "runs"]),
            Document::from_terms(1, "Dog runs", ["the", "dog", "runs"]),
            Document::from_terms(2, "Fox hides", ["a", "fox", "hides"]),
        ];
        let stop_words: StopWords = ["the", "a"].into_iter().map(String::from).collect();
        let mut engine = Engine::new(collection, stop_words, EngineConfig::default());
        engine.prepare(true, true);
        engine
    }

    fn ids(hits: &[SearchHit<'_>]) -> Vec<DocId> {
        hits.iter().map(|h| h.document.id).collect()
    }

    #[test]
    fn search_without_model_fails() {
        let mut engine = engine();
        assert!(matches!(engine.search("fox", TermViewOptions::default()), Err(RetrievalError::NoModel)));
    }

    #[test]
    fn helper_rejects_wrong_model() {
        let mut engine = engine();
        engine.set_model(ModelKind::Signature);
        let err = engine.inverted_list_search("fox").unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::ModelTypeMismatch { expected: ModelKind::InvertedList, found: ModelKind::Signature }
        ));
    }

    #[test]
    fn selecting_a_model_builds_nothing() {
        let mut engine = engine();
        engine.set_model(ModelKind::InvertedList);
        assert!(matches!(engine.inverted_list_search("fox"), Err(RetrievalError::IndexNotBuilt { .. })));
    }

    #[test]
    fn search_builds_lazily() {
        let mut engine = engine();
        engine.set_model(ModelKind::InvertedList);
        let hits = engine.search("dog hides", TermViewOptions::new(true, false)).unwrap();
        assert_eq!(ids(&hits), vec![1, 2]);
        assert!(hits.iter().all(|h| h.score == 1.0));
    }

    #[test]
    fn ensure_index_enables_helpers() {
        let mut engine = engine();
        engine.set_model(ModelKind::InvertedList);
        engine.ensure_index(TermViewOptions::new(true, false)).unwrap();
        assert_eq!(ids(&engine.inverted_list_search("fox").unwrap()), vec![0, 2]);
    }

    #[test]
    fn query_case_does_not_matter_when_stemming() {
        let mut engine = engine();
        engine.set_model(ModelKind::InvertedList);
        let options = TermViewOptions::new(false, true);
        let lower = ids(&engine.search("runs", options).unwrap());
        assert_eq!(lower, vec![0, 1]);
        assert_eq!(ids(&engine.search("RUNS", options).unwrap()), lower);
        assert_eq!(ids(&engine.search("Hiding", options).unwrap()), vec![2]);
    }

    #[test]
    fn new_stop_words_refilter_and_rebuild() {
        let mut engine = engine();
        engine.set_model(ModelKind::InvertedList);
        let options = TermViewOptions::new(true, false);
        assert_eq!(ids(&engine.search("fox", options).unwrap()), vec![0, 2]);

        engine.set_stop_words(["fox"].into_iter().map(String::from).collect());
        assert_eq!(engine.collection()[0].filtered_terms.as_deref(), Some(&["the".to_string(), "runs".to_string()][..]));
        assert!(engine.search("fox", options).unwrap().is_empty());
        assert_eq!(ids(&engine.search("the", options).unwrap()), vec![0, 1]);
    }

    #[test]
    fn snapshot_from_another_collection_is_rebuilt() {
        let options = TermViewOptions::new(true, false);
        let mut source = engine();
        source.set_model(ModelKind::InvertedList);
        source.ensure_index(options).unwrap();
        let model = source.model().cloned().unwrap();
        let meta = |num_docs| MetaFile {
            num_docs,
            created_at: String::new(),
            version: crate::persist::SNAPSHOT_VERSION,
            model: ModelKind::InvertedList,
            options,
        };

        let mut engine = engine();
        assert!(engine.install_snapshot(model.clone(), &meta(3)));
        assert_eq!(ids(&engine.inverted_list_search("fox").unwrap()), vec![0, 2]);

        assert!(!engine.install_snapshot(model, &meta(2)));
        assert!(matches!(engine.inverted_list_search("fox"), Err(RetrievalError::IndexNotBuilt { .. })));
        assert_eq!(ids(&engine.search("fox", options).unwrap()), vec![0, 2]);
    }

    #[test]
    fn stemming_applies_to_the_query() {
        let mut engine = engine();
        engine.set_model(ModelKind::Linear);
        let hits = engine.search("hiding", TermViewOptions::new(false, true)).unwrap();
        assert_eq!(ids(&hits), vec![2]);
    }

    #[test]
    fn linear_results_are_truncated() {
        let mut engine = engine();
        engine.config.output_k = 1;
        engine.set_model(ModelKind::Linear);
        let hits = engine.search("runs", TermViewOptions::default()).unwrap();
        assert_eq!(ids(&hits), vec![0]);
    }

    #[test]
    fn collection_change_discards_snapshot() {
        let mut engine = engine();
        engine.set_model(ModelKind::Signature);
        engine.ensure_index(TermViewOptions::default()).unwrap();
        engine.set_collection(vec![Document::from_terms(9, "x", ["owl"])]);
        assert!(matches!(engine.signature_search("owl"), Err(RetrievalError::IndexNotBuilt { .. })));
        let hits = engine.search("owl", TermViewOptions::default()).unwrap();
        assert_eq!(ids(&hits), vec![9]);
    }

    #[test]
    fn vector_search_ranks_and_drops_zero_scores() {
        let mut engine = engine();
        engine.set_model(ModelKind::VectorSpace);
        let hits = engine.search("fox hides", TermViewOptions::new(true, false)).unwrap();
        assert_eq!(ids(&hits), vec![2, 0]);
        // A single-term query weighs zero and therefore retrieves nothing.
        assert!(engine.search("fox", TermViewOptions::new(true, false)).unwrap().is_empty());
    }
}
