use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use websearch_core::persist::{load_link_graph, load_meta, load_vocabulary, StorePaths};
use websearch_core::{pagerank, retrieval, LinkGraph, Normalizer, VocabularyIndex};

pub struct ServerConfig {
    pub stores_dir: PathBuf,
    pub stopwords: Option<PathBuf>,
    pub epsilon: f64,
    pub max_iterations: usize,
}

impl ServerConfig {
    pub fn new<P: AsRef<Path>>(stores_dir: P) -> Self {
        Self {
            stores_dir: stores_dir.as_ref().to_path_buf(),
            stopwords: None,
            epsilon: pagerank::DEFAULT_EPSILON,
            max_iterations: pagerank::DEFAULT_MAX_ITERATIONS,
        }
    }
}

struct SearchContext {
    normalizer: Normalizer,
    vocabulary: VocabularyIndex,
    link_graph: LinkGraph,
    epsilon: f64,
    max_iterations: usize,
    num_docs: u64,
}

#[derive(Clone)]
pub struct AppState {
    ctx: Arc<SearchContext>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize {
    10
}

#[derive(Serialize)]
pub struct RankedHit {
    pub url: String,
    pub score: f64,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    /// Documents containing every query term, before any ranking.
    pub candidates: Vec<String>,
    pub total_candidates: usize,
    /// Vector-space (cosine) ranking, truncated to k.
    pub vector: Vec<RankedHit>,
    /// PageRank-with-teleport ranking over the induced graph, truncated to k.
    pub pagerank: Vec<RankedHit>,
}

/// Loads both stores once at startup; a load failure (including a corrupt
/// store) is fatal to the query session.
pub fn build_app(config: ServerConfig) -> Result<Router> {
    let paths = StorePaths::new(&config.stores_dir);
    let vocabulary = load_vocabulary(&paths).context("loading vocabulary store")?;
    let link_graph = load_link_graph(&paths).context("loading link graph store")?;
    let num_docs = load_meta(&paths)
        .map(|m| m.num_docs)
        .unwrap_or(vocabulary.doc_count() as u64);
    tracing::info!(
        docs = num_docs,
        terms = vocabulary.num_terms(),
        sources = link_graph.len(),
        "stores loaded"
    );

    let normalizer = match &config.stopwords {
        Some(path) => Normalizer::from_stopword_file(path)
            .with_context(|| format!("reading stop-word file {}", path.display()))?,
        None => Normalizer::with_default_stopwords(),
    };

    let state = AppState {
        ctx: Arc::new(SearchContext {
            normalizer,
            vocabulary,
            link_graph,
            epsilon: config.epsilon,
            max_iterations: config.max_iterations,
            num_docs,
        }),
    };

    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/search", get(search_handler))
        .with_state(state)
        .layer(cors);
    Ok(app)
}

async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "num_docs": state.ctx.num_docs,
        "num_terms": state.ctx.vocabulary.num_terms(),
    }))
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let ctx = &state.ctx;
    let k = params.k.clamp(1, 100);

    let stems = ctx.normalizer.normalize(&params.q);
    let candidates = retrieval::candidate_docs(&ctx.vocabulary, &stems);

    // An empty candidate set is a data state, not an error: both rankings
    // come back empty.
    let (vector, page_ranked) = if candidates.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        let vector = retrieval::rank(&ctx.vocabulary, &stems, &candidates);
        let graph = pagerank::build_query_graph(&ctx.link_graph, &candidates);
        let outcome = pagerank::pagerank_with_teleport(&graph, ctx.epsilon, ctx.max_iterations);
        (vector, outcome.scores)
    };

    let to_hits = |ranked: Vec<(String, f64)>| {
        ranked
            .into_iter()
            .take(k)
            .map(|(url, score)| RankedHit { url, score })
            .collect::<Vec<_>>()
    };

    let total_candidates = candidates.len();
    Json(SearchResponse {
        query: params.q,
        took_s: start.elapsed().as_secs_f64(),
        candidates,
        total_candidates,
        vector: to_hits(vector),
        pagerank: to_hits(page_ranked),
    })
}
