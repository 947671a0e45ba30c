//! Retrieval models and the term-view selection they share.

pub mod inverted;
pub mod linear;
pub mod signature;
pub mod vector;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::Document;
use crate::error::{Result, RetrievalError};

pub use inverted::InvertedListBooleanModel;
pub use linear::LinearBooleanModel;
pub use signature::SignatureBooleanModel;
pub use vector::VectorSpaceModel;

/// Which of a document's three term sequences a model consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermView {
    Raw,
    Filtered,
    Stemmed,
}

impl fmt::Display for TermView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TermView::Raw => "raw",
            TermView::Filtered => "stop-word-filtered",
            TermView::Stemmed => "stemmed",
        })
    }
}

/// The two pipeline flags an index is built with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermViewOptions {
    pub stopword_filtering: bool,
    pub stemming: bool,
}

impl TermViewOptions {
    pub fn new(stopword_filtering: bool, stemming: bool) -> Self {
        Self { stopword_filtering, stemming }
    }

    /// Stop-word filtering takes priority; when both flags are set the
    /// filtered, unstemmed terms are used.
    pub fn view(&self) -> TermView {
        if self.stopword_filtering {
            TermView::Filtered
        } else if self.stemming {
            TermView::Stemmed
        } else {
            TermView::Raw
        }
    }
}

/// Returns the term view `options` select for `document`.
pub fn select_terms(document: &Document, options: TermViewOptions) -> Result<&[String]> {
    let view = options.view();
    let terms = match view {
        TermView::Raw => Some(document.terms.as_slice()),
        TermView::Filtered => document.filtered_terms.as_deref(),
        TermView::Stemmed => document.stemmed_terms.as_deref(),
    };
    terms.ok_or(RetrievalError::MissingTermView { doc_id: document.id, view })
}

/// Lowercases a query and splits it on whitespace.
pub fn query_terms(query: &str) -> Vec<String> {
    query.to_lowercase().split_whitespace().map(str::to_string).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    Linear,
    InvertedList,
    Signature,
    VectorSpace,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] =
        [ModelKind::Linear, ModelKind::InvertedList, ModelKind::Signature, ModelKind::VectorSpace];
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModelKind::Linear => "Boolean Model (Linear)",
            ModelKind::InvertedList => "Boolean Model (Inverted List)",
            ModelKind::Signature => "Boolean Model (Signatures)",
            ModelKind::VectorSpace => "Vector Space Model",
        })
    }
}

/// The capabilities every retrieval model offers.
pub trait RetrievalModel {
    /// How the model sees a document.
    type DocumentRepr<'d>;
    /// How the model sees a query.
    type QueryRepr;

    fn kind(&self) -> ModelKind;

    fn document_to_representation<'d>(
        &self,
        document: &'d Document,
        options: TermViewOptions,
    ) -> Result<Self::DocumentRepr<'d>>;

    fn query_to_representation(&self, query: &str) -> Self::QueryRepr;

    /// Similarity of a document to a query; boolean models answer 1.0 or 0.0.
    fn match_score(&self, document: &Self::DocumentRepr<'_>, query: &Self::QueryRepr) -> f64;
}

/// A selected retrieval model together with whatever index snapshot it owns.
///
/// The linear model keeps no state; it borrows the collection when searching.
#[derive(Debug, Clone)]
pub enum Model {
    Linear,
    InvertedList(InvertedListBooleanModel),
    Signature(SignatureBooleanModel),
    VectorSpace(VectorSpaceModel),
}

impl Model {
    pub fn new(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Linear => Model::Linear,
            ModelKind::InvertedList => Model::InvertedList(InvertedListBooleanModel::new()),
            ModelKind::Signature => Model::Signature(SignatureBooleanModel::new()),
            ModelKind::VectorSpace => Model::VectorSpace(VectorSpaceModel::new()),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Model::Linear => ModelKind::Linear,
            Model::InvertedList(_) => ModelKind::InvertedList,
            Model::Signature(_) => ModelKind::Signature,
            Model::VectorSpace(_) => ModelKind::VectorSpace,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        let mut d = Document::from_terms(7, "t", ["the", "running", "foxes"]);
        d.filtered_terms = Some(vec!["running".into(), "foxes".into()]);
        d
    }

    #[test]
    fn view_priority() {
        assert_eq!(TermViewOptions::new(false, false).view(), TermView::Raw);
        assert_eq!(TermViewOptions::new(false, true).view(), TermView::Stemmed);
        assert_eq!(TermViewOptions::new(true, false).view(), TermView::Filtered);
        assert_eq!(TermViewOptions::new(true, true).view(), TermView::Filtered);
    }

    #[test]
    fn filtering_wins_over_stemming() {
        let d = doc();
        let terms = select_terms(&d, TermViewOptions::new(true, true)).unwrap();
        assert_eq!(terms, ["running", "foxes"]);
    }

    #[test]
    fn absent_view_is_an_error() {
        let d = doc();
        let err = select_terms(&d, TermViewOptions::new(false, true)).unwrap_err();
        assert!(matches!(err, RetrievalError::MissingTermView { doc_id: 7, view: TermView::Stemmed }));
    }

    #[test]
    fn query_is_lowercased_and_split() {
        assert_eq!(query_terms("  Fox\tRUNS  "), vec!["fox", "runs"]);
    }
}
