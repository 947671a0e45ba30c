//! Immutable index snapshots built in one pass over a collection.
//!
//! All maps are ordered so two builds over the same input serialize to the
//! same bytes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::document::{DocId, Document};
use crate::error::Result;
use crate::model::{select_terms, TermViewOptions};

/// 64-bit term-membership signature.
pub type Signature = u64;

pub const SIGNATURE_BITS: u32 = Signature::BITS;

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// FNV-1a over the UTF-8 bytes of a term. Fixed constants, so signatures are
/// reproducible across runs and processes.
pub fn term_hash(term: &str) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &b in term.as_bytes() {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Bit a term sets within a signature.
pub fn signature_bit(term: &str) -> u32 {
    (term_hash(term) % SIGNATURE_BITS as u64) as u32
}

pub fn create_signature<S: AsRef<str>>(terms: &[S]) -> Signature {
    terms.iter().fold(0, |signature, term| signature | (1u64 << signature_bit(term.as_ref())))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f64, // tf-idf, not length-normalized
}

/// Boolean inverted lists: term → ids of the documents containing it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub options: TermViewOptions,
    pub postings: BTreeMap<String, BTreeSet<DocId>>,
}

impl InvertedIndex {
    pub fn build(collection: &[Document], options: TermViewOptions) -> Result<Self> {
        let mut postings: BTreeMap<String, BTreeSet<DocId>> = BTreeMap::new();
        for document in collection {
            for term in select_terms(document, options)? {
                postings.entry(term.clone()).or_default().insert(document.id);
            }
        }
        tracing::info!(num_docs = collection.len(), num_terms = postings.len(), view = %options.view(), "built inverted index");
        Ok(Self { options, postings })
    }

    pub fn get(&self, term: &str) -> Option<&BTreeSet<DocId>> {
        self.postings.get(term)
    }

    /// Union of the posting sets of all `terms`.
    pub fn union<S: AsRef<str>>(&self, terms: &[S]) -> BTreeSet<DocId> {
        terms.iter().filter_map(|t| self.get(t.as_ref())).flatten().copied().collect()
    }
}

/// One signature per document, kept in collection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignatureIndex {
    pub options: TermViewOptions,
    pub signatures: Vec<(DocId, Signature)>,
}

impl SignatureIndex {
    pub fn build(collection: &[Document], options: TermViewOptions) -> Result<Self> {
        let signatures = collection
            .iter()
            .map(|document| -> Result<(DocId, Signature)> {
                Ok((document.id, create_signature(select_terms(document, options)?)))
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::info!(num_docs = signatures.len(), view = %options.view(), "built signature index");
        Ok(Self { options, signatures })
    }

    pub fn get(&self, doc_id: DocId) -> Option<Signature> {
        self.signatures.iter().find(|(id, _)| *id == doc_id).map(|(_, s)| *s)
    }
}

/// tf-idf postings plus per-document vector lengths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
    pub options: TermViewOptions,
    pub num_docs: u32,
    /// Postings in collection order for every term.
    pub postings: BTreeMap<String, Vec<Posting>>,
    /// L2 norm of each document's weights. Scoring is a raw dot product and
    /// does not divide by it.
    pub document_lengths: BTreeMap<DocId, f64>,
}

impl VectorIndex {
    pub fn build(collection: &[Document], options: TermViewOptions) -> Result<Self> {
        let mut postings: BTreeMap<String, Vec<Posting>> = BTreeMap::new();
        let mut document_lengths: BTreeMap<DocId, f64> = BTreeMap::new();

        // First pass: log-scaled term frequencies; the posting count per term is its df.
        for document in collection {
            let terms = select_terms(document, options)?;
            let mut counts: Vec<(&str, u32)> = Vec::new();
            let mut slot: HashMap<&str, usize> = HashMap::new();
            for term in terms {
                match slot.get(term.as_str()) {
                    Some(&i) => counts[i].1 += 1,
                    None => {
                        slot.insert(term.as_str(), counts.len());
                        counts.push((term.as_str(), 1));
                    }
                }
            }
            document_lengths.insert(document.id, 0.0);
            for (term, count) in counts {
                let tf = 1.0 + (count as f64).log10();
                postings.entry(term.to_string()).or_default().push(Posting { doc_id: document.id, weight: tf });
            }
        }

        // Second pass: scale by idf and accumulate squared lengths.
        let n = collection.len() as f64;
        for plist in postings.values_mut() {
            let idf = (n / plist.len() as f64).log10();
            for posting in plist.iter_mut() {
                posting.weight *= idf;
                *document_lengths.entry(posting.doc_id).or_insert(0.0) += posting.weight * posting.weight;
            }
        }
        for length in document_lengths.values_mut() {
            *length = length.sqrt();
        }

        tracing::info!(num_docs = collection.len(), num_terms = postings.len(), view = %options.view(), "built vector index");
        Ok(Self { options, num_docs: collection.len() as u32, postings, document_lengths })
    }

    pub fn get(&self, term: &str) -> Option<&[Posting]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    /// Number of documents containing `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, Vec::len)
    }

    /// `log10(N / df)`, or `None` for terms outside the index.
    pub fn idf(&self, term: &str) -> Option<f64> {
        match self.document_frequency(term) {
            0 => None,
            df => Some((self.num_docs as f64 / df as f64).log10()),
        }
    }

    pub fn document_length(&self, doc_id: DocId) -> Option<f64> {
        self.document_lengths.get(&doc_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> Vec<Document> {
        vec![
            Document::from_terms(0, "a", ["fox", "fox", "runs"]),
            Document::from_terms(1, "b", ["dog", "runs"]),
            Document::from_terms(2, "c", ["fox", "hides"]),
        ]
    }

    #[test]
    fn fnv1a_reference_values() {
        assert_eq!(term_hash(""), 0xcbf29ce484222325);
        assert_eq!(term_hash("a"), 0xaf63dc4c8601ec8c);
        assert_eq!(term_hash("foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn signature_sets_one_bit_per_distinct_term() {
        let sig = create_signature(&["fox", "fox"]);
        assert_eq!(sig.count_ones(), 1);
        assert_eq!(sig, 1u64 << signature_bit("fox"));
        assert_eq!(create_signature::<&str>(&[]), 0);
    }

    #[test]
    fn inverted_union() {
        let index = InvertedIndex::build(&collection(), TermViewOptions::default()).unwrap();
        let hits: Vec<DocId> = index.union(&["fox", "dog", "cat"]).into_iter().collect();
        assert_eq!(hits, vec![0, 1, 2]);
        assert!(index.get("cat").is_none());
    }

    #[test]
    fn vector_weights() {
        let index = VectorIndex::build(&collection(), TermViewOptions::default()).unwrap();
        let fox = index.get("fox").unwrap();
        let idf = (3.0f64 / 2.0).log10();
        assert_eq!(fox.len(), 2);
        assert_eq!(fox[0].doc_id, 0);
        assert!((fox[0].weight - (1.0 + 2f64.log10()) * idf).abs() < 1e-12);
        assert!((fox[1].weight - idf).abs() < 1e-12);

        let dog = (3.0f64).log10();
        let runs = idf;
        let expected = (dog * dog + runs * runs).sqrt();
        assert!((index.document_length(1).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn term_in_every_document_has_zero_weight() {
        let docs = vec![
            Document::from_terms(0, "a", ["fox", "the"]),
            Document::from_terms(1, "b", ["the", "dog", "the"]),
        ];
        let index = VectorIndex::build(&docs, TermViewOptions::default()).unwrap();
        assert_eq!(index.idf("the"), Some(0.0));
        assert!(index.get("the").unwrap().iter().all(|p| p.weight == 0.0));
    }

    #[test]
    fn empty_collection_builds_empty_indices() {
        let index = VectorIndex::build(&[], TermViewOptions::default()).unwrap();
        assert!(index.postings.is_empty());
        assert_eq!(index.num_docs, 0);
    }
}
