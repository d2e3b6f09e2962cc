use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;
use websearch_core::persist::{
    load_link_graph, load_vocabulary, save_link_graph, save_meta, save_vocabulary, MetaFile,
    StorePaths,
};
use websearch_core::{CrawlRecord, IndexingPipeline, Normalizer};

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Fold a crawled document feed into the vocabulary index and link graph", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index JSON/JSONL feed files into the persisted stores
    Build {
        /// Input path (feed file or directory of feed files)
        #[arg(long)]
        input: String,
        /// Store directory
        #[arg(long)]
        stores: String,
        /// Stop-word file, one word per line (built-in list if omitted)
        #[arg(long)]
        stopwords: Option<PathBuf>,
    },
    /// Print document/term/edge counts for a store directory
    Stats {
        /// Store directory
        #[arg(long)]
        stores: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, stores, stopwords } => build(&input, &stores, stopwords.as_deref()),
        Commands::Stats { stores } => stats(&stores),
    }
}

fn build(input: &str, stores: &str, stopwords: Option<&Path>) -> Result<()> {
    let paths = StorePaths::new(stores);

    // A corrupt store aborts the session up front; indexing against a
    // half-readable base would mask data loss.
    let vocabulary = load_vocabulary(&paths).context("loading vocabulary store")?;
    let link_graph = load_link_graph(&paths).context("loading link graph store")?;
    tracing::info!(
        docs = vocabulary.doc_count(),
        terms = vocabulary.num_terms(),
        sources = link_graph.len(),
        "loaded existing stores"
    );

    let normalizer = match stopwords {
        Some(path) => Normalizer::from_stopword_file(path)
            .with_context(|| format!("reading stop-word file {}", path.display()))?,
        None => Normalizer::with_default_stopwords(),
    };

    let mut pipeline = IndexingPipeline::new(&normalizer, vocabulary, link_graph);
    for file in feed_files(Path::new(input)) {
        ingest_file(&file, &mut pipeline)
            .with_context(|| format!("reading feed file {}", file.display()))?;
    }
    tracing::info!(indexed = pipeline.indexed(), skipped = pipeline.skipped(), "feed ingested");

    let (vocabulary, link_graph) = pipeline.into_stores();
    save_vocabulary(&paths, &vocabulary).context("saving vocabulary store")?;
    save_link_graph(&paths, &link_graph).context("saving link graph store")?;
    let meta = MetaFile {
        num_docs: vocabulary.doc_count() as u64,
        num_terms: vocabulary.num_terms() as u64,
        created_at: time::OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: 1,
    };
    save_meta(&paths, &meta).context("saving meta")?;

    tracing::info!(stores, docs = meta.num_docs, terms = meta.num_terms, "index build complete");
    Ok(())
}

fn stats(stores: &str) -> Result<()> {
    let paths = StorePaths::new(stores);
    let vocabulary = load_vocabulary(&paths).context("loading vocabulary store")?;
    let link_graph = load_link_graph(&paths).context("loading link graph store")?;
    println!("documents: {}", vocabulary.doc_count());
    println!("terms:     {}", vocabulary.num_terms());
    println!("sources:   {}", link_graph.len());
    println!("edges:     {}", link_graph.edge_count());
    Ok(())
}

fn feed_files(input: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
        files.sort();
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

/// JSONL feeds carry one record per line; .json feeds hold an array or a
/// single record. A line that fails to parse is logged and skipped, per
/// the per-document isolation policy.
fn ingest_file(file: &Path, pipeline: &mut IndexingPipeline) -> Result<()> {
    if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        let f = File::open(file)?;
        for (lineno, line) in BufReader::new(f).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<CrawlRecord>(&line) {
                Ok(record) => pipeline.ingest(&record),
                Err(e) => {
                    tracing::warn!(file = %file.display(), line = lineno + 1, error = %e, "skipping malformed record");
                }
            }
        }
        return Ok(());
    }

    let f = File::open(file)?;
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(f))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                match serde_json::from_value::<CrawlRecord>(v) {
                    Ok(record) => pipeline.ingest(&record),
                    Err(e) => {
                        tracing::warn!(file = %file.display(), error = %e, "skipping malformed record");
                    }
                }
            }
        }
        v @ serde_json::Value::Object(_) => {
            let record: CrawlRecord = serde_json::from_value(v)?;
            pipeline.ingest(&record);
        }
        _ => {}
    }
    Ok(())
}
