use std::collections::BTreeSet;

use crate::document::{DocId, Document};
use crate::error::{Result, RetrievalError};
use crate::index::InvertedIndex;
use crate::model::{query_terms, select_terms, ModelKind, RetrievalModel, TermViewOptions};

/// Boolean OR retrieval over inverted lists.
#[derive(Debug, Clone, Default)]
pub struct InvertedListBooleanModel {
    index: Option<InvertedIndex>,
}

impl InvertedListBooleanModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a previously built (or loaded) snapshot.
    pub fn with_index(index: InvertedIndex) -> Self {
        Self { index: Some(index) }
    }

    /// Replaces any existing snapshot with one built from `collection`.
    pub fn build_inverted_index(&mut self, collection: &[Document], options: TermViewOptions) -> Result<()> {
        self.index = Some(InvertedIndex::build(collection, options)?);
        Ok(())
    }

    pub fn index(&self) -> Result<&InvertedIndex> {
        self.index.as_ref().ok_or(RetrievalError::IndexNotBuilt { model: ModelKind::InvertedList })
    }

    /// Options the current snapshot was built with.
    pub fn built_with(&self) -> Option<TermViewOptions> {
        self.index.as_ref().map(|index| index.options)
    }

    /// Union of the posting sets of the query terms.
    pub fn search(&self, query: &str) -> Result<BTreeSet<DocId>> {
        let index = self.index()?;
        Ok(index.union(self.query_to_representation(query).as_slice()))
    }
}

impl RetrievalModel for InvertedListBooleanModel {
    type DocumentRepr<'d> = &'d [String];
    type QueryRepr = Vec<String>;

    fn kind(&self) -> ModelKind {
        ModelKind::InvertedList
    }

    fn document_to_representation<'d>(
        &self,
        document: &'d Document,
        options: TermViewOptions,
    ) -> Result<&'d [String]> {
        select_terms(document, options)
    }

    fn query_to_representation(&self, query: &str) -> Vec<String> {
        query_terms(query)
    }

    fn match_score(&self, document: &&[String], query: &Vec<String>) -> f64 {
        if query.iter().any(|term| document.contains(term)) {
            1.0
        } else {
            0.0
        }
    }
}
