use crate::index::DocId;
use std::collections::BTreeMap;

/// Weighted undirected graph of documents that showed up together in the
/// top results of the same query. Weights count co-occurrences.
///
/// Stored as a symmetric adjacency map; `weight(u, v) == weight(v, u)` always.
#[derive(Debug, Default, Clone)]
pub struct CooccurrenceGraph {
    adjacency: BTreeMap<DocId, BTreeMap<DocId, u32>>,
    edge_updates: u64,
}

impl CooccurrenceGraph {
    pub fn new() -> Self { Self::default() }

    /// Bumps the weight of the `u`-`v` edge. Self-loops are ignored.
    pub fn add_edge(&mut self, u: DocId, v: DocId) {
        if u == v {
            return;
        }
        *self.adjacency.entry(u).or_default().entry(v).or_insert(0) += 1;
        *self.adjacency.entry(v).or_default().entry(u).or_insert(0) += 1;
        self.edge_updates += 1;
        debug_assert_eq!(self.weight(u, v), self.weight(v, u));
    }

    /// Registers a node without edges.
    pub fn add_node(&mut self, id: DocId) {
        self.adjacency.entry(id).or_default();
    }

    pub fn node_count(&self) -> usize { self.adjacency.len() }

    pub fn is_empty(&self) -> bool { self.adjacency.is_empty() }

    /// Number of non-self-loop `add_edge` calls, repeats included.
    pub fn edge_updates(&self) -> u64 { self.edge_updates }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeMap::len).sum::<usize>() / 2
    }

    pub fn contains_node(&self, id: DocId) -> bool { self.adjacency.contains_key(&id) }

    /// 0 when the nodes are not connected.
    pub fn weight(&self, u: DocId, v: DocId) -> u32 {
        self.adjacency.get(&u).and_then(|n| n.get(&v)).copied().unwrap_or(0)
    }

    /// Nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = DocId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn neighbors(&self, id: DocId) -> impl Iterator<Item = (DocId, u32)> + '_ {
        self.adjacency.get(&id).into_iter().flat_map(|n| n.iter().map(|(&v, &w)| (v, w)))
    }

    /// Sum of incident edge weights.
    pub fn weighted_degree(&self, id: DocId) -> u64 {
        self.neighbors(id).map(|(_, w)| w as u64).sum()
    }

    /// Adds an edge for every pair of distinct positions in `docs`.
    pub fn connect_all(&mut self, docs: &[DocId]) {
        for (i, &u) in docs.iter().enumerate() {
            for &v in &docs[i + 1..] {
                self.add_edge(u, v);
            }
        }
    }
}
