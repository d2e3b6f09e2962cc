use anyhow::Result;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};
use websearch_server::{build_app, ServerConfig};

#[derive(Parser)]
#[command(name = "server")]
#[command(about = "Query front-end over the vocabulary index and link graph", long_about = None)]
struct Args {
    /// Store directory
    #[arg(long, default_value = "./stores")]
    stores: PathBuf,
    /// Stop-word file, one word per line (built-in list if omitted)
    #[arg(long)]
    stopwords: Option<PathBuf>,
    /// PageRank teleportation factor
    #[arg(long, default_value_t = websearch_core::pagerank::DEFAULT_EPSILON)]
    epsilon: f64,
    /// PageRank iteration cap
    #[arg(long, default_value_t = websearch_core::pagerank::DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut config = ServerConfig::new(&args.stores);
    config.stopwords = args.stopwords.clone();
    config.epsilon = args.epsilon;
    config.max_iterations = args.max_iterations;
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
