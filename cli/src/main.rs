use anyhow::{bail, Result};
use clap::Parser;
use rankcache_core::loader::{load_documents_file, read_query_log_file};
use rankcache_core::persist::{load_snapshot, IndexPaths};
use rankcache_core::replay::build_cooccurrence_graph;
use rankcache_core::{CachedSearcher, EngineConfig, InvertedIndex, Normalizer, PageRank, QueryResolver};
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

mod shell;

#[derive(Parser)]
#[command(name = "rankcache")]
#[command(about = "Interactive conjunctive search with co-occurrence ranking and an LRU result cache")]
struct Args {
    /// Index snapshot directory written by the indexer
    #[arg(long, default_value = "./index")]
    index: String,
    /// Index this document file at startup instead of loading a snapshot
    #[arg(long)]
    docs: Option<String>,
    /// Whitespace-separated stopword file; must match the one used for indexing
    #[arg(long)]
    stopwords: Option<String>,
    /// Stem terms; must match the indexing setting
    #[arg(long, default_value_t = false)]
    stem: bool,
    /// Historical queries, one per line, replayed to build the ranking graph
    #[arg(long)]
    query_log: Option<String>,
    /// JSON engine config; flags below override its fields
    #[arg(long)]
    config: Option<String>,
    #[arg(long)]
    cache_size: Option<usize>,
    #[arg(long)]
    top_k: Option<usize>,
    #[arg(long)]
    log_limit: Option<usize>,
    #[arg(long)]
    iterations: Option<usize>,
    #[arg(long)]
    damping: Option<f64>,
    #[arg(long)]
    threshold: Option<f64>,
}

impl Args {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(v) = self.cache_size { config.cache_capacity = v; }
        if let Some(v) = self.top_k { config.top_k = v; }
        if let Some(v) = self.log_limit { config.query_log_limit = v; }
        if let Some(v) = self.iterations { config.rank.max_iterations = v; }
        if let Some(v) = self.damping { config.rank.damping = v; }
        if let Some(v) = self.threshold { config.rank.threshold = v; }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let args = Args::parse();
    let config = args.engine_config()?;
    tracing::debug!(config = %serde_json::to_string(&config)?, "engine config");

    let mut normalizer = Normalizer::new().with_stemming(args.stem);
    if let Some(path) = &args.stopwords {
        normalizer = normalizer.with_stopwords_file(path)?;
    }

    let start = Instant::now();
    let index = match &args.docs {
        Some(path) => {
            let mut index = InvertedIndex::new();
            load_documents_file(path, &normalizer, &mut index, config.max_indexed_words)?;
            index
        }
        None => {
            let paths = IndexPaths::new(&args.index);
            if !paths.exists() {
                bail!("no index snapshot at {} (build one with the indexer or pass --docs)", args.index);
            }
            load_snapshot(&paths)?.0
        }
    };
    tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, num_docs = index.num_docs, "index ready");

    let mut resolver = QueryResolver::new(index, normalizer);
    if let Some(path) = &args.query_log {
        let start = Instant::now();
        let queries = read_query_log_file(path)?;
        let graph = build_cooccurrence_graph(&resolver, &queries, config.top_k, config.query_log_limit);
        let report = PageRank::new(config.rank.clone())?.rank(&graph);
        tracing::info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            scored = report.scores.len(),
            iterations = report.iterations,
            converged = report.converged,
            "relevance scores ready"
        );
        resolver.set_scores(Arc::new(report.scores));
    } else {
        tracing::warn!("no query log given, results keep index order");
    }

    let mut searcher = CachedSearcher::new(resolver, config.cache_capacity)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    shell::run(&mut searcher, stdin.lock(), stdout.lock())?;
    Ok(())
}
