use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use rankcache_core::loader::load_documents_file;
use rankcache_core::persist::{save_snapshot, IndexPaths};
use rankcache_core::{InvertedIndex, Normalizer};
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build an inverted index snapshot from line-oriented document files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a document file or a directory of them
    Build {
        /// Input path (file or directory of .dat/.txt files)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Whitespace-separated stopword file; the built-in English list is used otherwise
        #[arg(long)]
        stopwords: Option<String>,
        /// Stem terms with the English Snowball stemmer
        #[arg(long, default_value_t = false)]
        stem: bool,
        /// Stop after indexing this many words (0 = no limit)
        #[arg(long, default_value_t = 500_000)]
        max_words: u64,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, stopwords, stem, max_words } => {
            build_index(&input, &output, stopwords.as_deref(), stem, max_words)
        }
    }
}

fn build_index(input: &str, output: &str, stopwords: Option<&str>, stem: bool, max_words: u64) -> Result<()> {
    let input_path = Path::new(input);
    let out_paths = IndexPaths::new(output);
    fs::create_dir_all(&out_paths.root)?;

    let mut normalizer = Normalizer::new().with_stemming(stem);
    if let Some(path) = stopwords {
        normalizer = normalizer.with_stopwords_file(path)?;
    }

    let files = collect_inputs(input_path)?;
    let mut index = InvertedIndex::new();
    let mut remaining = (max_words > 0).then_some(max_words);
    for file in files {
        if remaining == Some(0) {
            tracing::info!(max_words, "word limit reached, skipping remaining files");
            break;
        }
        let summary = load_documents_file(&file, &normalizer, &mut index, remaining)?;
        tracing::info!(file = %file.display(), documents = summary.documents, malformed = summary.malformed, "ingested file");
        remaining = remaining.map(|r| r.saturating_sub(summary.indexed_words));
    }

    let meta = save_snapshot(&out_paths, &index)?;
    tracing::info!(output, num_docs = meta.num_docs, num_terms = meta.num_terms, "index build complete");
    Ok(())
}

fn collect_inputs(input_path: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "dat" | "txt") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }
    if files.is_empty() {
        bail!("no document files found at {}", input_path.display());
    }
    Ok(files)
}
