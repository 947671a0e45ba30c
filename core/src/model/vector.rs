use std::cmp::Ordering;
use std::collections::HashMap;

use crate::document::{DocId, Document};
use crate::error::{Result, RetrievalError};
use crate::index::VectorIndex;
use crate::model::{query_terms, select_terms, ModelKind, RetrievalModel, TermViewOptions};

/// Query term weights, in order of first appearance in the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryVector {
    pub weights: Vec<(String, f64)>,
}

impl QueryVector {
    /// Weighs each distinct query term by `(1 + log10(c)) * log10((Q + 1) / (c + 1))`,
    /// where `c` is its count in the query and `Q` the number of distinct terms.
    /// The idf factor comes from the query alone, not from corpus statistics.
    pub fn from_query(query: &str) -> Self {
        let mut counts: Vec<(String, u32)> = Vec::new();
        for term in query_terms(query) {
            match counts.iter_mut().find(|(t, _)| *t == term) {
                Some((_, c)) => *c += 1,
                None => counts.push((term, 1)),
            }
        }
        let distinct = counts.len() as f64;
        let weights = counts
            .into_iter()
            .map(|(term, count)| {
                let c = count as f64;
                let tf = 1.0 + c.log10();
                let idf = ((distinct + 1.0) / (c + 1.0)).log10();
                (term, tf * idf)
            })
            .collect();
        Self { weights }
    }

    pub fn weight(&self, term: &str) -> Option<f64> {
        self.weights.iter().find(|(t, _)| t == term).map(|(_, w)| *w)
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Terms by descending weight; equal weights keep query order.
    pub fn by_descending_weight(&self) -> Vec<(&str, f64)> {
        let mut terms: Vec<(&str, f64)> = self.weights.iter().map(|(t, w)| (t.as_str(), *w)).collect();
        terms.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        terms
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDocument {
    pub doc_id: DocId,
    pub score: f64,
}

/// tf-idf vector space retrieval with term-at-a-time score accumulation.
#[derive(Debug, Clone, Default)]
pub struct VectorSpaceModel {
    index: Option<VectorIndex>,
}

impl VectorSpaceModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(index: VectorIndex) -> Self {
        Self { index: Some(index) }
    }

    pub fn build_inverted_index(&mut self, collection: &[Document], options: TermViewOptions) -> Result<()> {
        self.index = Some(VectorIndex::build(collection, options)?);
        Ok(())
    }

    pub fn index(&self) -> Result<&VectorIndex> {
        self.index.as_ref().ok_or(RetrievalError::IndexNotBuilt { model: ModelKind::VectorSpace })
    }

    pub fn built_with(&self) -> Option<TermViewOptions> {
        self.index.as_ref().map(|index| index.options)
    }

    pub fn query_to_vector(&self, query: &str) -> QueryVector {
        QueryVector::from_query(query)
    }

    /// Top-`k` documents by dot product with the query vector.
    ///
    /// Query terms are processed by descending weight. Once more than `k`
    /// documents hold a score and the `k`-th best strictly beats all the rest,
    /// the remaining terms are skipped. Ties rank by the order in which
    /// documents were first scored.
    pub fn rank(&self, query: &QueryVector, k: usize) -> Result<Vec<ScoredDocument>> {
        let index = self.index()?;
        if k == 0 {
            return Ok(Vec::new());
        }

        // Accumulator position doubles as the first-seen sequence number.
        let mut accumulators: Vec<ScoredDocument> = Vec::new();
        let mut slot: HashMap<DocId, usize> = HashMap::new();
        let terms = query.by_descending_weight();
        for (processed, (term, query_weight)) in terms.iter().enumerate() {
            if let Some(postings) = index.get(term) {
                for posting in postings {
                    let i = *slot.entry(posting.doc_id).or_insert_with(|| {
                        accumulators.push(ScoredDocument { doc_id: posting.doc_id, score: 0.0 });
                        accumulators.len() - 1
                    });
                    accumulators[i].score += posting.weight * query_weight;
                }
            }

            if accumulators.len() > k {
                let mut scores: Vec<f64> = accumulators.iter().map(|a| a.score).collect();
                scores.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
                let threshold = scores[k - 1];
                if scores[k..].iter().all(|s| *s < threshold) {
                    tracing::debug!(processed = processed + 1, total = terms.len(), "stopping early");
                    break;
                }
            }
        }

        let mut ranked: Vec<(usize, ScoredDocument)> = accumulators.into_iter().enumerate().collect();
        ranked.sort_by(|(seq_a, a), (seq_b, b)| {
            b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal).then(seq_a.cmp(seq_b))
        });
        Ok(ranked.into_iter().take(k).map(|(_, scored)| scored).collect())
    }

    pub fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>> {
        self.rank(&self.query_to_vector(query), k)
    }
}

impl RetrievalModel for VectorSpaceModel {
    /// The document's tf-idf weights under the current snapshot's idf.
    type DocumentRepr<'d> = HashMap<&'d str, f64>;
    type QueryRepr = QueryVector;

    fn kind(&self) -> ModelKind {
        ModelKind::VectorSpace
    }

    fn document_to_representation<'d>(
        &self,
        document: &'d Document,
        options: TermViewOptions,
    ) -> Result<HashMap<&'d str, f64>> {
        let index = self.index()?;
        let mut counts: HashMap<&'d str, u32> = HashMap::new();
        for term in select_terms(document, options)? {
            *counts.entry(term.as_str()).or_insert(0) += 1;
        }
        Ok(counts
            .into_iter()
            .filter_map(|(term, count)| {
                let idf = index.idf(term)?;
                Some((term, (1.0 + (count as f64).log10()) * idf))
            })
            .collect())
    }

    fn query_to_representation(&self, query: &str) -> QueryVector {
        self.query_to_vector(query)
    }

    fn match_score(&self, document: &HashMap<&str, f64>, query: &QueryVector) -> f64 {
        query
            .weights
            .iter()
            .filter_map(|(term, weight)| document.get(term.as_str()).map(|w| w * weight))
            .sum()
    }
}
