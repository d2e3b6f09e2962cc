use crate::{DocId, LinkGraph};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Rounding applied to raw scores before the convergence check, so that
/// convergence detection is well-defined against floating-point noise.
pub const ROUND_DIGITS: i32 = 6;
/// Default teleportation (damping) factor.
pub const DEFAULT_EPSILON: f64 = 0.8;
/// Default iteration cap; the only built-in timeout for the power loop.
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Induced subgraph for one query, node -> out-edge set.
pub type QueryGraph = BTreeMap<DocId, BTreeSet<DocId>>;

#[derive(Debug)]
pub struct PageRankOutcome {
    /// Final scores, descending; ties keep node order.
    pub scores: Vec<(DocId, f64)>,
    /// Update iterations run after the uniform initialization.
    pub iterations: usize,
    /// True when the loop stopped on score equality rather than the cap.
    pub converged: bool,
}

/// Restricts the stored link graph to the neighborhood of a query: every
/// candidate with its stored out-edge set (empty when the candidate was
/// never seen as a source), plus every other stored source linking to at
/// least one candidate. Out-edges are taken verbatim from the store.
pub fn build_query_graph(link_graph: &LinkGraph, candidates: &[DocId]) -> QueryGraph {
    let mut graph = QueryGraph::new();
    for doc in candidates {
        let out = link_graph.out_links(doc).cloned().unwrap_or_default();
        graph.insert(doc.clone(), out);
    }
    let candidate_set: BTreeSet<&str> = candidates.iter().map(String::as_str).collect();
    for (source, dests) in link_graph.iter() {
        if graph.contains_key(source) {
            continue;
        }
        if dests.iter().any(|d| candidate_set.contains(d.as_str())) {
            graph.insert(source.clone(), dests.clone());
        }
    }
    graph
}

fn round_score(x: f64) -> f64 {
    let factor = 10f64.powi(ROUND_DIGITS);
    (x * factor).round() / factor
}

fn normalize(scores: &mut BTreeMap<&str, f64>) {
    let sum: f64 = scores.values().sum();
    if sum == 1.0 || sum == 0.0 {
        return;
    }
    for v in scores.values_mut() {
        *v /= sum;
    }
}

/// Power iteration with teleportation over the induced graph.
///
/// Update rule per node A:
///   score[A] = eps/n + (1 - eps) * sum over B linking to A of prev[B]/deg(B)
///
/// Iteration 0 initializes every node to 1/n with no eps term. Raw scores
/// are rounded to `ROUND_DIGITS` decimals, then the vector is normalized
/// to sum 1.0 (skipped when the sum is already exactly 1.0). The loop
/// stops when the rounded, normalized map equals the previous iteration's
/// map exactly, or at `max_iterations`.
///
/// A node with no out-edges contributes nothing to any successor; its
/// mass is not redistributed (normalization rescales the remainder).
pub fn pagerank_with_teleport(
    graph: &QueryGraph,
    epsilon: f64,
    max_iterations: usize,
) -> PageRankOutcome {
    let n = graph.len();
    if n == 0 {
        return PageRankOutcome { scores: Vec::new(), iterations: 0, converged: true };
    }

    // Reverse adjacency restricted to graph nodes, with out-degrees over
    // the full stored edge sets.
    let mut in_edges: BTreeMap<&str, Vec<(&str, usize)>> = BTreeMap::new();
    for node in graph.keys() {
        in_edges.insert(node.as_str(), Vec::new());
    }
    for (source, dests) in graph.iter() {
        let degree = dests.len();
        for dest in dests {
            if let Some(sources) = in_edges.get_mut(dest.as_str()) {
                sources.push((source.as_str(), degree));
            }
        }
    }

    let uniform = 1.0 / n as f64;
    let mut prev: BTreeMap<&str, f64> =
        graph.keys().map(|node| (node.as_str(), uniform)).collect();

    let mut iterations = 0;
    let mut converged = false;
    while iterations < max_iterations {
        iterations += 1;
        let mut next: BTreeMap<&str, f64> = BTreeMap::new();
        for node in graph.keys() {
            let mut score = epsilon / n as f64;
            for (source, degree) in &in_edges[node.as_str()] {
                score += (1.0 - epsilon) * prev[source] / *degree as f64;
            }
            next.insert(node.as_str(), round_score(score));
        }
        normalize(&mut next);
        if next == prev {
            converged = true;
            prev = next;
            break;
        }
        prev = next;
    }
    tracing::debug!(nodes = n, iterations, converged, "pagerank finished");

    let mut scores: Vec<(DocId, f64)> =
        prev.into_iter().map(|(node, s)| (node.to_string(), s)).collect();
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    PageRankOutcome { scores, iterations, converged }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cycle() -> QueryGraph {
        let mut g = QueryGraph::new();
        g.insert("http://a".into(), ["http://b".to_string()].into_iter().collect());
        g.insert("http://b".into(), ["http://a".to_string()].into_iter().collect());
        g
    }

    #[test]
    fn symmetric_two_node_graph_is_a_fixed_point() {
        let out = pagerank_with_teleport(&two_cycle(), 0.8, 50);
        assert!(out.converged);
        // Detected by equality, well before the iteration cap.
        assert!(out.iterations < 50);
        for (_, score) in &out.scores {
            assert!((score - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn dangling_node_keeps_its_teleport_mass_only() {
        // a -> b, b dangles. b accumulates a's mass; normalization keeps
        // the vector summing to 1 despite the leaked mass.
        let mut g = QueryGraph::new();
        g.insert("http://a".into(), ["http://b".to_string()].into_iter().collect());
        g.insert("http://b".into(), BTreeSet::new());
        let out = pagerank_with_teleport(&g, 0.8, 50);
        let sum: f64 = out.scores.iter().map(|(_, s)| s).sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert_eq!(out.scores[0].0, "http://b");
        assert!(out.scores[0].1 > out.scores[1].1);
    }

    #[test]
    fn empty_graph_yields_no_scores() {
        let out = pagerank_with_teleport(&QueryGraph::new(), 0.8, 50);
        assert!(out.scores.is_empty());
        assert!(out.converged);
    }

    #[test]
    fn query_graph_pulls_in_linking_sources() {
        let mut store = LinkGraph::new();
        store.add_edges("http://cand", ["http://out"]);
        store.add_edges("http://fan", ["http://cand", "http://elsewhere"]);
        store.add_edges("http://unrelated", ["http://elsewhere"]);

        let g = build_query_graph(&store, &["http://cand".to_string()]);
        assert!(g.contains_key("http://cand"));
        // fan links to a candidate, so it joins with its full edge set.
        assert_eq!(g["http://fan"].len(), 2);
        assert!(!g.contains_key("http://unrelated"));
        // A candidate absent from the store still becomes a node.
        let g2 = build_query_graph(&store, &["http://ghost".to_string()]);
        assert!(g2["http://ghost"].is_empty());
    }
}
