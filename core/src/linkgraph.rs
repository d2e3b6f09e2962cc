use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Directed link graph: source URL -> distinct absolute destination URLs.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unions `destinations` into the stored set for `source`, keeping
    /// only scheme-qualified absolute URLs. Reprocessing a source only
    /// ever grows its destination set.
    pub fn add_edges<I>(&mut self, source: &str, destinations: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let set = self.edges.entry(source.to_string()).or_default();
        for dest in destinations {
            let dest = dest.into();
            if is_absolute(&dest) {
                set.insert(dest);
            }
        }
    }

    pub fn out_links(&self, source: &str) -> Option<&BTreeSet<String>> {
        self.edges.get(source)
    }

    pub fn contains_source(&self, source: &str) -> bool {
        self.edges.contains_key(source)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Total number of stored edges, for stats reporting.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|s| s.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_relative_urls_and_unions() {
        let mut g = LinkGraph::new();
        g.add_edges("a", ["http://x", "relative", "http://y"]);
        g.add_edges("a", ["http://y", "http://z"]);

        let dests = g.out_links("a").unwrap();
        let expected: BTreeSet<String> =
            ["http://x", "http://y", "http://z"].iter().map(|s| s.to_string()).collect();
        assert_eq!(dests, &expected);
    }

    #[test]
    fn source_entry_created_even_without_valid_destinations() {
        let mut g = LinkGraph::new();
        g.add_edges("a", ["mailto:someone", "#fragment"]);
        assert!(g.contains_source("a"));
        assert!(g.out_links("a").unwrap().is_empty());
    }
}
