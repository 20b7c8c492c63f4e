//! PageRank over the co-occurrence graph.
//!
//! Each round sets `score(j) = (1 - d) + d * sum(prev(i) * w(i, j) / out(i))`
//! over the neighbours `i` of `j`, where `out(i)` is the weighted degree of
//! `i`. Rounds stop once no score moves more than the threshold, or at the
//! iteration cap. Final scores are divided by their sum.

use crate::config::RankConfig;
use crate::error::SearchError;
use crate::graph::CooccurrenceGraph;
use crate::index::DocId;
use std::collections::HashMap;

pub type ScoreVector = HashMap<DocId, f64>;

#[derive(Debug, Clone)]
pub struct RankReport {
    pub scores: ScoreVector,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct PageRank {
    config: RankConfig,
}

impl PageRank {
    pub fn new(config: RankConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RankConfig { &self.config }

    pub fn rank(&self, graph: &CooccurrenceGraph) -> RankReport {
        if graph.is_empty() {
            tracing::info!("no nodes in graph, nothing to rank");
            return RankReport { scores: ScoreVector::new(), iterations: 0, converged: true };
        }

        // dense positions so each round works on plain vectors
        let nodes: Vec<DocId> = graph.nodes().collect();
        let position: HashMap<DocId, usize> = nodes.iter().enumerate().map(|(i, &d)| (d, i)).collect();
        let incoming: Vec<Vec<(usize, f64)>> = nodes
            .iter()
            .map(|&j| graph.neighbors(j).map(|(i, w)| (position[&i], w as f64)).collect())
            .collect();
        let out_weight: Vec<f64> = nodes.iter().map(|&i| graph.weighted_degree(i) as f64).collect();

        let n = nodes.len();
        let d = self.config.damping;
        let mut scores = vec![1.0 / n as f64; n];
        let mut prev = vec![0.0; n];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_iterations && !converged {
            prev.copy_from_slice(&scores);
            converged = true;
            for j in 0..n {
                let mut sum = 0.0;
                for &(i, w) in &incoming[j] {
                    if out_weight[i] > 0.0 {
                        sum += prev[i] * w / out_weight[i];
                    }
                }
                scores[j] = (1.0 - d) + d * sum;
                if (scores[j] - prev[j]).abs() > self.config.threshold {
                    converged = false;
                }
            }
            iterations += 1;
        }
        tracing::info!(nodes = n, iterations, converged, "pagerank finished");

        let total: f64 = scores.iter().sum();
        if total > 0.0 {
            for s in scores.iter_mut() {
                *s /= total;
            }
        }
        RankReport { scores: nodes.into_iter().zip(scores).collect(), iterations, converged }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pagerank() -> PageRank { PageRank::new(RankConfig::default()).unwrap() }

    #[test]
    fn empty_graph_has_no_scores() {
        let report = pagerank().rank(&CooccurrenceGraph::new());
        assert!(report.scores.is_empty());
        assert_eq!(report.iterations, 0);
    }

    #[test]
    fn two_nodes_split_evenly() {
        let mut g = CooccurrenceGraph::new();
        g.add_edge(10, 20);
        let report = pagerank().rank(&g);
        assert!((report.scores[&10] - 0.5).abs() < 1e-9);
        assert!((report.scores[&20] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn hub_outranks_leaves_and_scores_sum_to_one() {
        let mut g = CooccurrenceGraph::new();
        for leaf in 1..=4 {
            g.add_edge(0, leaf);
        }
        g.add_edge(0, 1);
        let report = pagerank().rank(&g);
        let total: f64 = report.scores.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        for leaf in 1..=4 {
            assert!(report.scores[&0] > report.scores[&leaf]);
        }
        assert!(report.scores[&1] > report.scores[&2]);
    }

    #[test]
    fn isolated_node_still_gets_a_score() {
        let mut g = CooccurrenceGraph::new();
        g.add_edge(1, 2);
        g.add_node(99);
        let report = pagerank().rank(&g);
        let isolated = report.scores[&99];
        assert!(isolated.is_finite() && isolated > 0.0);
        assert!(isolated < report.scores[&1]);
        let total: f64 = report.scores.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn iteration_cap_bounds_the_run() {
        let mut g = CooccurrenceGraph::new();
        g.connect_all(&[1, 2, 3]);
        g.add_edge(3, 4);
        let config = RankConfig { max_iterations: 1, threshold: 0.0, ..RankConfig::default() };
        let report = PageRank::new(config).unwrap().rank(&g);
        assert_eq!(report.iterations, 1);
        assert!(!report.converged);
    }

    #[test]
    fn invalid_damping_is_rejected() {
        for damping in [0.0, 1.0, -0.5, f64::NAN] {
            let config = RankConfig { damping, ..RankConfig::default() };
            assert!(matches!(PageRank::new(config), Err(SearchError::InvalidDamping(_))));
        }
    }
}
