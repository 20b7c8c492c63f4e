//! Conjunctive query resolution over an inverted index, with optional
//! reordering by a precomputed relevance score.

use crate::index::DocId;
use crate::rank::ScoreVector;
use std::sync::Arc;

/// Score given to documents missing from the score vector so they sort last.
pub const UNSCORED: f64 = 1e-9;

/// Text-to-terms collaborator.
pub trait Normalize {
    /// Ordered, stopword-filtered terms of `text`; empty when nothing survives.
    /// Terms never contain whitespace.
    fn clean(&self, text: &str) -> Vec<String>;
}

/// Posting-list collaborator.
pub trait PostingSource {
    /// `None` when the term was never indexed.
    fn lookup(&self, term: &str) -> Option<&[DocId]>;
    /// Ids present in both inputs, as a new list.
    fn intersect(&self, a: &[DocId], b: &[DocId]) -> Vec<DocId>;
}

impl<T: Normalize + ?Sized> Normalize for &T {
    fn clean(&self, text: &str) -> Vec<String> { (**self).clean(text) }
}

impl<T: PostingSource + ?Sized> PostingSource for &T {
    fn lookup(&self, term: &str) -> Option<&[DocId]> { (**self).lookup(term) }
    fn intersect(&self, a: &[DocId], b: &[DocId]) -> Vec<DocId> { (**self).intersect(a, b) }
}

pub struct QueryResolver<I, N> {
    index: I,
    normalizer: N,
    scores: Option<Arc<ScoreVector>>,
}

impl<I: PostingSource, N: Normalize> QueryResolver<I, N> {
    pub fn new(index: I, normalizer: N) -> Self {
        Self { index, normalizer, scores: None }
    }

    pub fn index(&self) -> &I { &self.index }

    /// Attaches the relevance scores used by [`QueryResolver::query`]. The
    /// scores must be final: they are shared read-only from here on.
    pub fn set_scores(&mut self, scores: Arc<ScoreVector>) {
        self.scores = Some(scores);
    }

    pub fn scores(&self) -> Option<&ScoreVector> { self.scores.as_deref() }

    pub fn clean(&self, text: &str) -> Vec<String> { self.normalizer.clean(text) }

    /// Resolves `text` and, when scores are attached, orders the result by descending score.
    ///
    /// Documents with equal scores (including all unscored ones) keep the
    /// index's intersection order; no further tie-break is guaranteed.
    pub fn query(&self, text: &str) -> Vec<DocId> {
        let terms = self.clean(text);
        if terms.is_empty() {
            tracing::warn!(query = text, "no valid terms in query");
            return Vec::new();
        }
        self.query_terms(&terms)
    }

    /// Same as [`QueryResolver::query`] but never reorders by score. Used to
    /// replay query logs while the scores are still being built.
    pub fn query_unranked(&self, text: &str) -> Vec<DocId> {
        self.resolve_terms(&self.clean(text))
    }

    /// Ranked resolution of already-normalized terms.
    pub fn query_terms(&self, terms: &[String]) -> Vec<DocId> {
        let docs = self.resolve_terms(terms);
        match &self.scores {
            Some(scores) if !docs.is_empty() => rank_by_score(docs, scores),
            _ => docs,
        }
    }

    /// Intersects the posting lists of `terms` left to right. An unknown term
    /// or an empty intermediate result stops the lookups immediately.
    pub fn resolve_terms(&self, terms: &[String]) -> Vec<DocId> {
        let Some((first, rest)) = terms.split_first() else {
            return Vec::new();
        };
        let Some(list) = self.index.lookup(first) else {
            return Vec::new();
        };
        let mut acc = list.to_vec();
        for term in rest {
            let Some(list) = self.index.lookup(term) else {
                tracing::debug!(term = %term, "unknown term, conjunction is empty");
                return Vec::new();
            };
            acc = self.index.intersect(&acc, list);
            if acc.is_empty() {
                return acc;
            }
        }
        acc
    }
}

/// Stable sort by descending score; documents missing from `scores` get [`UNSCORED`].
pub fn rank_by_score(docs: Vec<DocId>, scores: &ScoreVector) -> Vec<DocId> {
    let mut scored: Vec<(DocId, f64)> = docs
        .into_iter()
        .map(|d| (d, scores.get(&d).copied().unwrap_or(UNSCORED)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.into_iter().map(|(d, _)| d).collect()
}
