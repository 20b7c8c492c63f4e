use crate::query::PostingSource;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

pub type DocId = u32;

/// Term to posting-list map. Posting lists hold ascending document ids without duplicates.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub postings: HashMap<String, Vec<DocId>>,
    pub num_docs: u32,
    /// Term occurrences accepted into the index, repeats within a document included.
    pub indexed_words: u64,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Records that `term` occurs in `doc_id`. Documents must be added in ascending id order.
    pub fn add_occurrence(&mut self, term: &str, doc_id: DocId) {
        self.indexed_words += 1;
        self.num_docs = self.num_docs.max(doc_id + 1);
        let list = self.postings.entry(term.to_string()).or_default();
        match list.last() {
            Some(&last) if last == doc_id => {}
            Some(&last) => {
                debug_assert!(last < doc_id, "documents must be indexed in ascending id order");
                list.push(doc_id);
            }
            None => list.push(doc_id),
        }
    }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    /// Linear merge of two ascending lists.
    pub fn intersect_sorted(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
        let mut out = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    out.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        out
    }
}

impl PostingSource for InvertedIndex {
    fn lookup(&self, term: &str) -> Option<&[DocId]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    fn intersect(&self, a: &[DocId], b: &[DocId]) -> Vec<DocId> {
        Self::intersect_sorted(a, b)
    }
}
