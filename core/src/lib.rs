//! Small-collection information retrieval: a term normalization pipeline with a
//! Porter stemmer, and boolean (linear, inverted-list, signature) and
//! tf-idf vector space retrieval models over it.

pub mod document;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod extraction;
pub mod index;
pub mod model;
pub mod persist;
pub mod porter;
pub mod tokenizer;

pub use document::{DocId, Document};
pub use engine::{Engine, EngineConfig, SearchHit};
pub use error::{Result, RetrievalError};
pub use index::{InvertedIndex, Posting, Signature, SignatureIndex, VectorIndex};
pub use model::{Model, ModelKind, RetrievalModel, TermView, TermViewOptions};
pub use tokenizer::StopWords;
