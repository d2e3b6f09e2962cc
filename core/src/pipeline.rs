use crate::{LinkGraph, Normalizer, VocabularyIndex};
use serde::Deserialize;

/// One record of the crawler feed: extracted title/body text plus the
/// outgoing links harvested at crawl time (resolved to absolute form
/// where possible; relative leftovers are filtered by the link graph).
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlRecord {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub links: Vec<String>,
}

/// Strict left-to-right fold of the document feed into the two stores.
///
/// Per-document failures are isolated: a bad record is logged and
/// skipped, never aborting the batch.
pub struct IndexingPipeline<'a> {
    normalizer: &'a Normalizer,
    vocabulary: VocabularyIndex,
    link_graph: LinkGraph,
    indexed: usize,
    skipped: usize,
}

impl<'a> IndexingPipeline<'a> {
    /// Starts from previously loaded stores so an indexing session can
    /// extend an existing index.
    pub fn new(normalizer: &'a Normalizer, vocabulary: VocabularyIndex, link_graph: LinkGraph) -> Self {
        Self { normalizer, vocabulary, link_graph, indexed: 0, skipped: 0 }
    }

    pub fn ingest(&mut self, record: &CrawlRecord) {
        if record.url.is_empty() {
            tracing::warn!("skipping record with empty url");
            self.skipped += 1;
            return;
        }
        let stems = self.normalizer.normalize(&format!("{}\n{}", record.title, record.body));
        self.vocabulary.add_document(&record.url, &stems);
        self.link_graph.add_edges(&record.url, record.links.iter().cloned());
        self.indexed += 1;
        tracing::debug!(url = %record.url, stems = stems.len(), links = record.links.len(), "indexed document");
    }

    pub fn indexed(&self) -> usize {
        self.indexed
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn vocabulary(&self) -> &VocabularyIndex {
        &self.vocabulary
    }

    pub fn link_graph(&self) -> &LinkGraph {
        &self.link_graph
    }

    pub fn into_stores(self) -> (VocabularyIndex, LinkGraph) {
        (self.vocabulary, self.link_graph)
    }
}
