use crate::graph::CooccurrenceGraph;
use crate::query::{Normalize, PostingSource, QueryResolver};

const PROGRESS_EVERY: usize = 1000;

/// Builds the co-occurrence graph by replaying historical queries.
///
/// Each query is resolved without score ranking; the first `top_k` documents
/// of its result are connected pairwise. Empty lines are skipped and do not
/// count towards `limit`.
pub fn build_cooccurrence_graph<I, N, Q, S>(
    resolver: &QueryResolver<I, N>,
    queries: Q,
    top_k: usize,
    limit: usize,
) -> CooccurrenceGraph
where
    I: PostingSource,
    N: Normalize,
    Q: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut graph = CooccurrenceGraph::new();
    let mut replayed = 0usize;
    for query in queries {
        if replayed >= limit {
            break;
        }
        let query = query.as_ref();
        if query.trim().is_empty() {
            continue;
        }
        let docs = resolver.query_unranked(query);
        let top = &docs[..docs.len().min(top_k)];
        graph.connect_all(top);
        replayed += 1;
        if replayed % PROGRESS_EVERY == 0 {
            tracing::info!(replayed, "replaying query log");
        }
    }
    tracing::info!(
        replayed,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        edge_updates = graph.edge_updates(),
        "co-occurrence graph built"
    );
    graph
}
