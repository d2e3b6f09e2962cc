use crate::{DocId, VocabularyIndex};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// Boolean AND over the query terms: only documents containing every term
/// survive. If any term is unseen the candidate set is empty; an empty
/// query also yields no candidates. Output order is the ordered postings
/// of the first term, filtered, which keeps downstream tie-breaking
/// deterministic.
pub fn candidate_docs(index: &VocabularyIndex, query_terms: &[String]) -> Vec<DocId> {
    let mut terms = query_terms.iter();
    let Some(first) = terms.next() else {
        return Vec::new();
    };
    let Some(postings) = index.postings_for(first) else {
        return Vec::new();
    };
    let mut candidates: Vec<DocId> = postings.keys().cloned().collect();
    for term in terms {
        let Some(postings) = index.postings_for(term) else {
            return Vec::new();
        };
        candidates.retain(|doc| postings.contains_key(doc));
        if candidates.is_empty() {
            return candidates;
        }
    }
    candidates
}

#[derive(Default)]
struct Accum {
    dot: f64,
    sum_q2: f64,
    sum_d2: f64,
}

/// Cosine similarity between the query term-frequency vector and each
/// candidate's posting vector. Term weight is the raw frequency on both
/// sides; no idf factor is applied. Zero-score documents are omitted.
/// Descending by score, ties keep candidate order (stable sort).
pub fn rank(
    index: &VocabularyIndex,
    query_terms: &[String],
    candidates: &[DocId],
) -> Vec<(DocId, f64)> {
    let mut qtf: BTreeMap<&str, u32> = BTreeMap::new();
    for term in query_terms {
        *qtf.entry(term.as_str()).or_insert(0) += 1;
    }
    let candidate_set: HashSet<&str> = candidates.iter().map(String::as_str).collect();

    let mut sums: BTreeMap<&str, Accum> = BTreeMap::new();
    for (term, postings) in index.terms() {
        // Terms outside the query have weight 0 and contribute nothing.
        let Some(&q) = qtf.get(term.as_str()) else {
            continue;
        };
        let qw = f64::from(q);
        for (doc, &tf) in postings {
            if !candidate_set.contains(doc.as_str()) {
                continue;
            }
            let dw = f64::from(tf);
            let acc = sums.entry(doc.as_str()).or_default();
            acc.sum_q2 += qw * qw;
            acc.sum_d2 += dw * dw;
            acc.dot += dw * qw;
        }
    }

    let mut scored: Vec<(DocId, f64)> = Vec::new();
    for doc in candidates {
        let Some(acc) = sums.get(doc.as_str()) else {
            continue;
        };
        let denom = (acc.sum_d2 * acc.sum_q2).sqrt();
        if denom == 0.0 {
            continue;
        }
        scored.push((doc.clone(), acc.dot / denom));
    }
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> VocabularyIndex {
        let mut idx = VocabularyIndex::new();
        // {"cat": {"d1": 2, "d2": 1}, "dog": {"d1": 1}}
        idx.add_document("d1", &["cat".into(), "cat".into(), "dog".into()]);
        idx.add_document("d2", &["cat".into()]);
        idx
    }

    #[test]
    fn candidates_require_every_term() {
        let idx = fixture();
        let q = vec!["cat".to_string(), "cat".to_string(), "dog".to_string()];
        // d2 lacks "dog", so the AND intersection excludes it entirely.
        assert_eq!(candidate_docs(&idx, &q), vec!["d1".to_string()]);
    }

    #[test]
    fn unseen_term_empties_the_candidate_set() {
        let idx = fixture();
        let q = vec!["cat".to_string(), "zebra".to_string()];
        assert!(candidate_docs(&idx, &q).is_empty());
        assert!(candidate_docs(&idx, &[]).is_empty());
    }

    #[test]
    fn cosine_score_of_exact_match_is_one() {
        let idx = fixture();
        let q = vec!["cat".to_string(), "cat".to_string(), "dog".to_string()];
        let candidates = candidate_docs(&idx, &q);
        let ranked = rank(&idx, &q, &candidates);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].0, "d1");
        // d1's vector (cat:2, dog:1) is parallel to the query vector.
        assert!((ranked[0].1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn higher_overlap_ranks_first() {
        let mut idx = VocabularyIndex::new();
        idx.add_document("d1", &["cat".into(), "cat".into(), "cat".into(), "dog".into()]);
        idx.add_document("d2", &["cat".into(), "dog".into(), "dog".into(), "dog".into()]);
        let q = vec!["cat".to_string(), "cat".to_string(), "dog".to_string()];
        let candidates = candidate_docs(&idx, &q);
        assert_eq!(candidates.len(), 2);
        let ranked = rank(&idx, &q, &candidates);
        assert_eq!(ranked[0].0, "d1");
        assert!(ranked[0].1 > ranked[1].1);
    }
}
