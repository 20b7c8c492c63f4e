pub mod cache;
pub mod cached;
pub mod config;
pub mod error;
pub mod graph;
pub mod index;
pub mod loader;
pub mod persist;
pub mod query;
pub mod rank;
pub mod replay;
pub mod table;
pub mod tokenizer;

pub use cache::{CacheStats, LruCache};
pub use cached::{CachedSearcher, Lookup, Origin};
pub use config::{EngineConfig, RankConfig};
pub use error::SearchError;
pub use graph::CooccurrenceGraph;
pub use index::{DocId, InvertedIndex};
pub use query::{Normalize, PostingSource, QueryResolver};
pub use rank::{PageRank, RankReport, ScoreVector};
pub use table::OpenTable;
pub use tokenizer::Normalizer;
