use serde::{Deserialize, Serialize};
use std::fmt;

use crate::porter::stem_terms;
use crate::tokenizer::{filter_stop_words, tokenize, StopWords};

pub type DocId = u32;

/// A single document of the collection together with the term views derived from its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "document_id")]
    pub id: DocId,
    pub title: String,
    pub raw_text: String,
    /// Lowercased tokens with punctuation and possessives stripped.
    pub terms: Vec<String>,
    /// `terms` minus stop words; `None` until the filtering stage ran.
    #[serde(default)]
    pub filtered_terms: Option<Vec<String>>,
    /// `terms` reduced to Porter stems; `None` until the stemming stage ran.
    #[serde(default)]
    pub stemmed_terms: Option<Vec<String>>,
}

impl Document {
    pub fn new(id: DocId, title: impl Into<String>, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let terms = tokenize(&raw_text);
        Self { id, title: title.into(), raw_text, terms, filtered_terms: None, stemmed_terms: None }
    }

    /// Builds a document from already normalized terms; the raw text is their space-joined form.
    pub fn from_terms<I, S>(id: DocId, title: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        Self { id, title: title.into(), raw_text: terms.join(" "), terms, filtered_terms: None, stemmed_terms: None }
    }

    pub fn apply_stop_words(&mut self, stop_words: &StopWords) {
        self.filtered_terms = Some(filter_stop_words(&self.terms, stop_words));
    }

    pub fn apply_stemming(&mut self) {
        self.stemmed_terms = Some(stem_terms(&self.terms));
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.title)
    }
}

/// Fills `filtered_terms` for every document of the collection.
pub fn filter_collection(collection: &mut [Document], stop_words: &StopWords) {
    for document in collection.iter_mut() {
        document.apply_stop_words(stop_words);
    }
    tracing::debug!(docs = collection.len(), stop_words = stop_words.len(), "filtered collection");
}

/// Fills `stemmed_terms` for every document of the collection.
pub fn stem_collection(collection: &mut [Document]) {
    for document in collection.iter_mut() {
        document.apply_stemming();
    }
    tracing::debug!(docs = collection.len(), "stemmed collection");
}
