use crate::document::{DocId, Document};
use crate::error::{Result, RetrievalError};
use crate::index::{create_signature, Signature, SignatureIndex};
use crate::model::{query_terms, select_terms, ModelKind, RetrievalModel, TermViewOptions};

/// Boolean retrieval over 64-bit term signatures.
///
/// A document matches when its signature covers every bit of the query
/// signature. Hash collisions can produce false positives, never false
/// negatives.
#[derive(Debug, Clone, Default)]
pub struct SignatureBooleanModel {
    index: Option<SignatureIndex>,
}

/// `true` iff every bit of `query` is set in `document`.
pub fn signature_matches(document: Signature, query: Signature) -> bool {
    document & query == query
}

impl SignatureBooleanModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(index: SignatureIndex) -> Self {
        Self { index: Some(index) }
    }

    pub fn build_signature_index(&mut self, collection: &[Document], options: TermViewOptions) -> Result<()> {
        self.index = Some(SignatureIndex::build(collection, options)?);
        Ok(())
    }

    pub fn index(&self) -> Result<&SignatureIndex> {
        self.index.as_ref().ok_or(RetrievalError::IndexNotBuilt { model: ModelKind::Signature })
    }

    pub fn built_with(&self) -> Option<TermViewOptions> {
        self.index.as_ref().map(|index| index.options)
    }

    /// Ids whose signature covers the query signature, in collection order.
    pub fn search(&self, query: &str) -> Result<Vec<DocId>> {
        let index = self.index()?;
        let query = self.query_to_representation(query);
        Ok(index
            .signatures
            .iter()
            .filter(|(_, signature)| signature_matches(*signature, query))
            .map(|(id, _)| *id)
            .collect())
    }
}

impl RetrievalModel for SignatureBooleanModel {
    type DocumentRepr<'d> = Signature;
    type QueryRepr = Signature;

    fn kind(&self) -> ModelKind {
        ModelKind::Signature
    }

    fn document_to_representation<'d>(&self, document: &'d Document, options: TermViewOptions) -> Result<Signature> {
        Ok(create_signature(select_terms(document, options)?))
    }

    fn query_to_representation(&self, query: &str) -> Signature {
        create_signature(query_terms(query).as_slice())
    }

    fn match_score(&self, document: &Signature, query: &Signature) -> f64 {
        if signature_matches(*document, *query) {
            1.0
        } else {
            0.0
        }
    }
}
