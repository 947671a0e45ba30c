//! Splits a plain-text fable anthology into documents.
//!
//! A fable starts with a title line surrounded by blank lines: three blank
//! lines before it and two after it. The title line ends in a letter. The
//! body begins on the third line after the title.

use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;

use crate::document::{DocId, Document};
use crate::error::Result;
use crate::tokenizer::remove_symbols;

/// Lines between a title and the first line of its body, inclusive of the title.
const BODY_OFFSET: usize = 3;

lazy_static! {
    static ref TITLE: Regex = Regex::new(r"[a-zA-Z]$").expect("valid regex");
}

fn is_blank(line: &str) -> bool {
    line.trim_end_matches('\r').is_empty()
}

/// Line numbers at which fables start.
fn fable_starts(lines: &[&str]) -> Vec<usize> {
    let mut starts = Vec::new();
    for i in 0..lines.len().saturating_sub(5) {
        let framed = is_blank(lines[i])
            && is_blank(lines[i + 1])
            && is_blank(lines[i + 2])
            && is_blank(lines[i + 4])
            && is_blank(lines[i + 5]);
        if framed && TITLE.is_match(lines[i + 3].trim_end_matches('\r')) {
            starts.push(i + 3);
        }
    }
    starts
}

/// Extracts every fable of `content` as a document with sequential ids from 0.
pub fn extract_collection(content: &str) -> Vec<Document> {
    let lines: Vec<&str> = content.lines().collect();
    let starts = fable_starts(&lines);
    let mut collection = Vec::with_capacity(starts.len());
    for (n, &start) in starts.iter().enumerate() {
        let end = starts.get(n + 1).copied().unwrap_or(lines.len());
        let block = &lines[start..end];
        let title = block[0].trim();
        let body = block.iter().skip(BODY_OFFSET).map(|l| l.trim_end_matches('\r')).collect::<Vec<_>>().join(" ");
        collection.push(Document::new(n as DocId, title, remove_symbols(body.trim())));
    }
    tracing::info!(num_docs = collection.len(), "extracted collection");
    collection
}

pub fn extract_collection_from_file(path: &Path) -> Result<Vec<Document>> {
    let content = fs::read_to_string(path)?;
    Ok(extract_collection(&content))
}
