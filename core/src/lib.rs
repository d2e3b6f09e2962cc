pub mod error;
pub mod linkgraph;
pub mod normalizer;
pub mod pagerank;
pub mod persist;
pub mod pipeline;
pub mod retrieval;
pub mod vocab;

pub use error::StoreError;
pub use linkgraph::LinkGraph;
pub use normalizer::Normalizer;
pub use pipeline::{CrawlRecord, IndexingPipeline};
pub use vocab::VocabularyIndex;

/// Documents are keyed by their canonical URL; no separate numeric id space.
pub type DocId = String;
