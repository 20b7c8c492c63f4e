use criterion::{criterion_group, criterion_main, Criterion};
use rankcache_core::query::Normalize;
use rankcache_core::{CooccurrenceGraph, LruCache, Normalizer, PageRank, RankConfig};

const TEXT: &str = "Caches keep recently used query results close at hand. When the cache is full, \
the least recently used entry is evicted to make room. Ranking reorders conjunctive results \
by a score computed from documents that were returned together for historical queries.";

fn bench_clean(c: &mut Criterion) {
    let normalizer = Normalizer::new();
    c.bench_function("normalize_paragraph", |b| b.iter(|| normalizer.clean(TEXT)));
}

fn bench_cache(c: &mut Criterion) {
    let keys: Vec<String> = (0..256).map(|i| format!("term{}_term{}", i % 97, i % 31)).collect();
    c.bench_function("lru_put_get_cap64", |b| {
        b.iter(|| {
            let mut cache = LruCache::new(64).expect("non-zero capacity");
            for (i, k) in keys.iter().enumerate() {
                if cache.get(k).is_none() {
                    cache.put(k.clone(), vec![i as u32]);
                }
            }
            cache.hits()
        })
    });
}

fn bench_pagerank(c: &mut Criterion) {
    let mut graph = CooccurrenceGraph::new();
    for q in 0..500u32 {
        let top: Vec<u32> = (0..10).map(|k| (q * 7 + k * 13) % 2000).collect();
        graph.connect_all(&top);
    }
    let ranker = PageRank::new(RankConfig::default()).expect("valid config");
    c.bench_function("pagerank_2000_nodes", |b| b.iter(|| ranker.rank(&graph)));
}

criterion_group!(benches, bench_clean, bench_cache, bench_pagerank);
criterion_main!(benches);
