//! Precision and recall against a ground-truth file of relevant document ids.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

use crate::document::DocId;
use crate::error::{Result, RetrievalError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundTruth {
    relevant: BTreeSet<DocId>,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

impl GroundTruth {
    /// Parses lines holding either a bare id or `<label> - id1,id2,...`.
    /// Blank lines and lines starting with `#` are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut relevant = BTreeSet::new();
        for (n, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let invalid = || RetrievalError::InvalidGroundTruth { line: n + 1, content: line.to_string() };
            let ids = match line.split_once('-') {
                Some((_, ids)) => ids,
                None => line,
            };
            for id in ids.split(',') {
                relevant.insert(id.trim().parse::<DocId>().map_err(|_| invalid())?);
            }
        }
        Ok(Self { relevant })
    }

    /// Reads a ground-truth file; `None` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "ground truth file not found");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn relevant(&self) -> &BTreeSet<DocId> {
        &self.relevant
    }

    fn true_positives(&self, retrieved: &[DocId]) -> usize {
        retrieved.iter().filter(|id| self.relevant.contains(*id)).count()
    }

    /// Share of retrieved documents that are relevant, rounded to two decimals.
    pub fn precision(&self, retrieved: &[DocId]) -> f64 {
        if retrieved.is_empty() {
            return 0.0;
        }
        round2(self.true_positives(retrieved) as f64 / retrieved.len() as f64)
    }

    /// Share of relevant documents that were retrieved, rounded to two decimals.
    pub fn recall(&self, retrieved: &[DocId]) -> f64 {
        if self.relevant.is_empty() {
            return 0.0;
        }
        round2(self.true_positives(retrieved) as f64 / self.relevant.len() as f64)
    }
}
