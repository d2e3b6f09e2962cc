use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Per-term postings: documentID -> occurrence count (always >= 1).
pub type Postings = BTreeMap<DocId, u32>;

/// Inverted index mapping each stem to the documents containing it.
///
/// Ordered maps keep iteration, ranking and the serialized form
/// deterministic. All mutation goes through methods on the owned state;
/// the internal mapping is never handed out mutably.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyIndex {
    terms: BTreeMap<String, Postings>,
}

impl VocabularyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence per stem for `doc_id`. Additive merge:
    /// re-ingesting a document increments existing counts, it never
    /// resets them. Skipping already-indexed documents is the caller's
    /// policy, not this component's.
    pub fn add_document(&mut self, doc_id: &str, stems: &[String]) {
        for stem in stems {
            let postings = self.terms.entry(stem.clone()).or_default();
            *postings.entry(doc_id.to_string()).or_insert(0) += 1;
        }
    }

    /// `None` means the term was never seen, which callers treat as an
    /// empty postings map.
    pub fn postings_for(&self, term: &str) -> Option<&Postings> {
        self.terms.get(term)
    }

    /// Number of documents the term occurs in.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.terms.get(term).map_or(0, |p| p.len())
    }

    /// Distinct documents appearing anywhere in the index.
    pub fn doc_count(&self) -> usize {
        let mut docs: BTreeSet<&str> = BTreeSet::new();
        for postings in self.terms.values() {
            docs.extend(postings.keys().map(String::as_str));
        }
        docs.len()
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&String, &Postings)> {
        self.terms.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accumulate_additively() {
        let mut idx = VocabularyIndex::new();
        idx.add_document("d1", &["run".into(), "run".into(), "jump".into()]);
        let postings = idx.postings_for("run").unwrap();
        assert_eq!(postings.get("d1"), Some(&2));

        idx.add_document("d1", &["run".into()]);
        let postings = idx.postings_for("run").unwrap();
        assert_eq!(postings.get("d1"), Some(&3));
    }

    #[test]
    fn unseen_term_has_no_postings() {
        let idx = VocabularyIndex::new();
        assert!(idx.postings_for("ghost").is_none());
        assert_eq!(idx.document_frequency("ghost"), 0);
    }

    #[test]
    fn doc_count_is_distinct_over_all_terms() {
        let mut idx = VocabularyIndex::new();
        idx.add_document("d1", &["cat".into(), "dog".into()]);
        idx.add_document("d2", &["dog".into()]);
        assert_eq!(idx.doc_count(), 2);
        assert_eq!(idx.document_frequency("dog"), 2);
    }
}
