use crate::document::{DocId, Document};
use crate::error::Result;
use crate::model::{query_terms, select_terms, ModelKind, RetrievalModel, TermViewOptions};

/// Boolean OR retrieval by scanning every document; no index.
#[derive(Debug, Clone, Copy)]
pub struct LinearBooleanModel<'c> {
    documents: &'c [Document],
}

impl<'c> LinearBooleanModel<'c> {
    pub fn new(documents: &'c [Document]) -> Self {
        Self { documents }
    }

    /// Score of every document in collection order.
    pub fn scores(&self, query: &str, options: TermViewOptions) -> Result<Vec<(f64, &'c Document)>> {
        let query = self.query_to_representation(query);
        self.documents
            .iter()
            .map(|document| -> Result<(f64, &'c Document)> {
                let terms = self.document_to_representation(document, options)?;
                Ok((self.match_score(&terms, &query), document))
            })
            .collect()
    }

    /// Ids of the documents sharing at least one term with the query, in collection order.
    pub fn search(&self, query: &str, options: TermViewOptions) -> Result<Vec<DocId>> {
        Ok(self
            .scores(query, options)?
            .into_iter()
            .filter(|(score, _)| *score > 0.0)
            .map(|(_, document)| document.id)
            .collect())
    }
}

impl RetrievalModel for LinearBooleanModel<'_> {
    type DocumentRepr<'d> = &'d [String];
    type QueryRepr = Vec<String>;

    fn kind(&self) -> ModelKind {
        ModelKind::Linear
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
