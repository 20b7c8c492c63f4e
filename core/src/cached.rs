use crate::cache::{CacheStats, LruCache};
use crate::error::SearchError;
use crate::index::DocId;
use crate::query::{Normalize, PostingSource, QueryResolver};
use crate::rank::ScoreVector;
use std::sync::Arc;

// Terms never contain whitespace, so a space cannot be confused with term text.
const KEY_SEPARATOR: &str = " ";

/// Where a [`Lookup`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Nothing survived normalization; the cache was not consulted.
    EmptyQuery,
    CacheHit,
    /// Cache miss, resolved against the index.
    Index,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub docs: Vec<DocId>,
    pub origin: Origin,
}

/// Ranked query resolution fronted by an LRU cache of result lists.
///
/// The cache owns its lists; callers always receive their own copy.
pub struct CachedSearcher<I, N> {
    resolver: QueryResolver<I, N>,
    cache: LruCache<Vec<DocId>>,
}

/// Canonical cache key: terms sorted and joined, so term order does not matter.
pub fn cache_key(terms: &[String]) -> String {
    let mut sorted: Vec<&str> = terms.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    debug_assert!(sorted.iter().all(|t| !t.contains(KEY_SEPARATOR)), "term contains the key separator");
    sorted.join(KEY_SEPARATOR)
}

impl<I: PostingSource, N: Normalize> CachedSearcher<I, N> {
    pub fn new(resolver: QueryResolver<I, N>, capacity: usize) -> Result<Self, SearchError> {
        Ok(Self { resolver, cache: LruCache::new(capacity)? })
    }

    pub fn resolver(&self) -> &QueryResolver<I, N> { &self.resolver }

    /// Attaches new relevance scores. Cached lists were ordered by the old
    /// scores, so the cache is emptied; counters are kept.
    pub fn set_scores(&mut self, scores: Arc<ScoreVector>) {
        self.resolver.set_scores(scores);
        if !self.cache.is_empty() {
            tracing::debug!(entries = self.cache.len(), "scores changed, dropping cached results");
            self.cache.clear();
        }
    }

    pub fn cache(&self) -> &LruCache<Vec<DocId>> { &self.cache }

    pub fn cache_mut(&mut self) -> &mut LruCache<Vec<DocId>> { &mut self.cache }

    pub fn stats(&self) -> CacheStats { self.cache.stats() }

    pub fn query_with_cache(&mut self, text: &str) -> Lookup {
        let terms = self.resolver.clean(text);
        if terms.is_empty() {
            tracing::warn!(query = text, "no valid terms in query");
            return Lookup { docs: Vec::new(), origin: Origin::EmptyQuery };
        }
        let key = cache_key(&terms);
        if let Some(docs) = self.cache.get(&key) {
            tracing::debug!(key = %key, docs = docs.len(), "cache hit");
            return Lookup { docs: docs.clone(), origin: Origin::CacheHit };
        }
        tracing::debug!(key = %key, "cache miss, querying index");
        let docs = self.resolver.query_terms(&terms);
        if !docs.is_empty() {
            self.cache.put(key, docs.clone());
        }
        Lookup { docs, origin: Origin::Index }
    }
}
