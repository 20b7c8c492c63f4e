//! Line-oriented input formats: the document collection and the query log.
//!
//! Documents are one per line with the indexable content after the last
//! `||`; the document id is the 0-based line number. Query logs hold one raw
//! query per line.

use crate::index::{DocId, InvertedIndex};
use crate::tokenizer::Normalizer;
use anyhow::{Context, Result};
use std::fs::File;
use std::borrow::Cow;
use std::io::{BufRead, BufReader};
use std::path::Path;

const FIELD_SEPARATOR: &str = "||";
const PROGRESS_EVERY: u32 = 100;

/// Yields each line of `reader` without its terminator. Bytes that are not
/// valid UTF-8 become U+FFFD, so one bad line cannot end the stream.
fn lossy_lines<R: BufRead>(mut reader: R) -> impl Iterator<Item = std::io::Result<String>> {
    let mut buf = Vec::new();
    std::iter::from_fn(move || {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                let line = match String::from_utf8_lossy(&buf) {
                    Cow::Borrowed(s) => s.to_string(),
                    Cow::Owned(s) => {
                        tracing::warn!(line = %s.chars().take(50).collect::<String>(), "invalid UTF-8 replaced");
                        s
                    }
                };
                Some(Ok(line))
            }
            Err(e) => Some(Err(e)),
        }
    })
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub documents: u32,
    pub malformed: u32,
    pub indexed_words: u64,
    /// Indexing stopped early at the word limit.
    pub truncated: bool,
}

/// Content part of a document line, or `None` when the line has no separator or no content.
pub fn document_content(line: &str) -> Option<&str> {
    let at = line.rfind(FIELD_SEPARATOR)?;
    let content = &line[at + FIELD_SEPARATOR.len()..];
    if content.is_empty() { None } else { Some(content) }
}

/// Indexes one document line under `doc_id`, returning how many words were added.
pub fn index_document(line: &str, doc_id: DocId, normalizer: &Normalizer, index: &mut InvertedIndex) -> Option<u64> {
    index.num_docs = index.num_docs.max(doc_id + 1);
    let content = document_content(line)?;
    let mut added = 0u64;
    for (term, _pos) in normalizer.tokenize(content) {
        index.add_occurrence(&term, doc_id);
        added += 1;
    }
    Some(added)
}

/// Reads documents from `reader` into `index`. Ids continue from `index.num_docs`.
pub fn load_documents<R: BufRead>(
    reader: R,
    normalizer: &Normalizer,
    index: &mut InvertedIndex,
    max_indexed_words: Option<u64>,
) -> Result<LoadSummary> {
    let mut summary = LoadSummary::default();
    let mut doc_id: DocId = index.num_docs;
    for line in lossy_lines(reader) {
        if max_indexed_words.is_some_and(|max| summary.indexed_words >= max) {
            tracing::info!(limit = max_indexed_words, "word limit reached, stopping indexing");
            summary.truncated = true;
            break;
        }
        let line = line?;
        match index_document(&line, doc_id, normalizer, index) {
            Some(added) => summary.indexed_words += added,
            None => {
                let preview: String = line.chars().take(50).collect();
                tracing::warn!(doc_id, line = %preview, "malformed document line");
                summary.malformed += 1;
            }
        }
        doc_id += 1;
        summary.documents += 1;
        if summary.documents % PROGRESS_EVERY == 0 {
            tracing::debug!(documents = summary.documents, indexed_words = summary.indexed_words, "indexing");
        }
    }
    tracing::info!(
        documents = summary.documents,
        malformed = summary.malformed,
        indexed_words = summary.indexed_words,
        num_terms = index.num_terms(),
        "documents indexed"
    );
    Ok(summary)
}

pub fn load_documents_file<P: AsRef<Path>>(
    path: P,
    normalizer: &Normalizer,
    index: &mut InvertedIndex,
    max_indexed_words: Option<u64>,
) -> Result<LoadSummary> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("opening documents {}", path.display()))?;
    load_documents(BufReader::new(f), normalizer, index, max_indexed_words)
}

/// Reads a query log, dropping blank lines.
pub fn read_query_log<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut queries = Vec::new();
    for line in lossy_lines(reader) {
        let line = line?;
        if line.trim().is_empty() { continue; }
        queries.push(line);
    }
    Ok(queries)
}

pub fn read_query_log_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("opening query log {}", path.display()))?;
    read_query_log(BufReader::new(f))
}
