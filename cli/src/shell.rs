use anyhow::Result;
use rankcache_core::query::{Normalize, PostingSource};
use rankcache_core::{CacheStats, CachedSearcher, Origin};
use std::io::{BufRead, Write};
use std::time::Instant;

const EXIT: &str = "exit";
const SHOWN_RESULTS: usize = 10;
const SHOWN_ENTRIES: usize = 5;

/// Reads queries line by line until `exit` or end of input, answering each
/// through the cache, then prints the cumulative cache metrics.
pub fn run<I, N, R, W>(searcher: &mut CachedSearcher<I, N>, input: R, mut out: W) -> Result<()>
where
    I: PostingSource,
    N: Normalize,
    R: BufRead,
    W: Write,
{
    writeln!(out, "cache capacity: {} entries, LRU replacement", searcher.cache().capacity())?;
    writeln!(out, "enter a query ('{EXIT}' to quit):")?;
    for line in input.lines() {
        let line = line?;
        let query = line.trim();
        if query == EXIT {
            break;
        }
        if query.is_empty() {
            writeln!(out, "please enter a query")?;
            continue;
        }

        let start = Instant::now();
        let lookup = searcher.query_with_cache(query);
        let elapsed = start.elapsed();

        match lookup.origin {
            Origin::EmptyQuery => writeln!(out, "no valid terms in query")?,
            Origin::CacheHit => writeln!(out, "served from cache (hit)")?,
            Origin::Index => writeln!(out, "not in cache (miss), searched the index")?,
        }
        if lookup.docs.is_empty() {
            writeln!(out, "no documents found")?;
        } else {
            let top: Vec<String> = lookup.docs.iter().take(SHOWN_RESULTS).map(u32::to_string).collect();
            writeln!(out, "documents found: {}", lookup.docs.len())?;
            writeln!(out, "top {}: [{}]", top.len(), top.join(", "))?;
        }
        writeln!(out, "search time: {:.3} ms", elapsed.as_secs_f64() * 1000.0)?;
        print_cache_state(searcher, &mut out)?;
        writeln!(out, "enter a query ('{EXIT}' to quit):")?;
    }
    print_metrics(&searcher.stats(), &mut out)?;
    Ok(())
}

fn print_cache_state<I, N, W: Write>(searcher: &CachedSearcher<I, N>, out: &mut W) -> Result<()>
where
    I: PostingSource,
    N: Normalize,
{
    let cache = searcher.cache();
    writeln!(out, "=== cache state ===")?;
    writeln!(out, "entries: {}/{}", cache.len(), cache.capacity())?;
    writeln!(out, "hits: {}, misses: {}", cache.hits(), cache.misses())?;
    for (rank, (key, docs, hits)) in cache.iter().take(SHOWN_ENTRIES).enumerate() {
        writeln!(out, "  {}. {} (docs: {}, hits: {})", rank + 1, key, docs.len(), hits)?;
    }
    if cache.len() > SHOWN_ENTRIES {
        writeln!(out, "  ... and {} more", cache.len() - SHOWN_ENTRIES)?;
    }
    Ok(())
}

fn print_metrics<W: Write>(stats: &CacheStats, out: &mut W) -> Result<()> {
    writeln!(out, "=== cache metrics ===")?;
    writeln!(out, "queries: {}", stats.total_queries)?;
    writeln!(out, "hits: {}", stats.hits)?;
    writeln!(out, "misses: {}", stats.misses)?;
    writeln!(out, "hit rate: {:.2}%", stats.hit_rate * 100.0)?;
    writeln!(out, "miss rate: {:.2}%", stats.miss_rate * 100.0)?;
    writeln!(out, "replacements: {}", stats.replacements)?;
    writeln!(out, "insertions: {}", stats.insertions)?;
    writeln!(out, "entries: {}/{}", stats.size, stats.capacity)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankcache_core::{InvertedIndex, Normalizer, QueryResolver};
    use std::io::Cursor;

    fn searcher() -> CachedSearcher<InvertedIndex, Normalizer> {
        let mut index = InvertedIndex::new();
        for d in [3, 4, 8] {
            index.add_occurrence("lru", d);
        }
        index.add_occurrence("tombstone", 4);
        CachedSearcher::new(QueryResolver::new(index, Normalizer::new()), 2).unwrap()
    }

    fn transcript(input: &str) -> (String, CacheStats) {
        let mut s = searcher();
        let mut out = Vec::new();
        run(&mut s, Cursor::new(input), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), s.stats())
    }

    #[test]
    fn repeated_query_is_served_from_cache() {
        let (text, stats) = transcript("lru\nLRU\nexit\nlru\n");
        assert!(text.contains("top 3: [3, 4, 8]"));
        assert!(text.contains("served from cache (hit)"));
        assert!(text.contains("1. lru (docs: 3, hits: 1)"));
        assert_eq!((stats.hits, stats.misses), (1, 1));
        assert!(text.contains("hit rate: 50.00%"));
    }

    #[test]
    fn blank_and_stopword_lines_are_reported() {
        let (text, stats) = transcript("\nthe\ntombstone lru\n");
        assert!(text.contains("please enter a query"));
        assert!(text.contains("no valid terms in query"));
        assert!(text.contains("top 1: [4]"));
        assert_eq!(stats.total_queries, 1);
    }
}
