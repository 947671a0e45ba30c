use crate::model::{ModelKind, TermView};
use crate::DocId;
use thiserror::Error;

/// Errors raised by the retrieval engine and its persistence glue.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// A model-specific query was issued before the model built its index.
    #[error("{model} has no index; build it before searching")]
    IndexNotBuilt { model: ModelKind },

    /// A model-specific helper was called against a different kind of model.
    #[error("expected a {expected} model, found {found}")]
    ModelTypeMismatch { expected: ModelKind, found: ModelKind },

    /// The term view selected for a document was never produced by the pipeline.
    #[error("document {doc_id} has no {view} terms; run that pipeline stage first")]
    MissingTermView { doc_id: DocId, view: TermView },

    #[error("document {0} is not part of the collection")]
    UnknownDocument(DocId),

    #[error("no retrieval model selected")]
    NoModel,

    #[error("invalid ground truth entry on line {line}: {content:?}")]
    InvalidGroundTruth { line: usize, content: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
