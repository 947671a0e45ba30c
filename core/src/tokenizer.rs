use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::document::Document;

/// Membership-only set of lowercase stop words.
pub type StopWords = HashSet<String>;

/// Share of all term occurrences above which a term counts as too frequent.
const HIGH_FREQUENCY_RATIO: f64 = 0.01;
/// Terms occurring at most this many times in the whole collection count as too rare.
const LOW_FREQUENCY_LIMIT: usize = 2;

lazy_static! {
    static ref PUNCTUATION: Regex = Regex::new(r"[[:punct:]]").expect("valid regex");
}

/// Lowercases `text`, drops possessive `'s` markers and deletes ASCII punctuation.
pub fn remove_symbols(text: &str) -> String {
    let lowered = text.to_lowercase().replace("'s", "");
    PUNCTUATION.replace_all(&lowered, "").into_owned()
}

/// Tokenize text into raw terms: symbol removal followed by a whitespace split.
pub fn tokenize(text: &str) -> Vec<String> {
    remove_symbols(text).split_whitespace().map(str::to_string).collect()
}

pub fn is_stop_word(term: &str, stop_words: &StopWords) -> bool {
    stop_words.contains(term)
}

pub fn filter_stop_words(terms: &[String], stop_words: &StopWords) -> Vec<String> {
    terms.iter().filter(|t| !is_stop_word(t, stop_words)).cloned().collect()
}

/// Derives a stop-word set from the collection itself (Crouch's method).
///
/// A term is a stop word when its collection-wide count exceeds 1% of all term
/// occurrences, or when it occurs at most twice.
pub fn stop_words_by_frequency(collection: &[Document]) -> StopWords {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut total = 0usize;
    for document in collection {
        for term in &document.terms {
            *counts.entry(term.as_str()).or_insert(0) += 1;
            total += 1;
        }
    }
    let high = total as f64 * HIGH_FREQUENCY_RATIO;
    let stop_words: StopWords = counts
        .into_iter()
        .filter(|(_, count)| *count as f64 > high || *count <= LOW_FREQUENCY_LIMIT)
        .map(|(term, _)| term.to_string())
        .collect();
    tracing::info!(total_terms = total, stop_words = stop_words.len(), "derived stop words by frequency");
    stop_words
}
